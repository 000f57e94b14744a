//! Document types for the course content graph.
//!
//! Documents reference each other by id. `Category::courses`,
//! `Course::modules` and `Module::lessons` are denormalized back-references
//! that the catalog keeps in step with the forward references.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// LocalizedText
// ============================================================================

/// Text keyed by language code (`"en"`, `"ar"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Creates an empty text map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the text for a language.
    #[must_use]
    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(lang.into(), text.into());
        self
    }

    /// Returns the text stored for exactly this language.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Returns `true` if the language has non-blank text.
    pub fn is_filled(&self, lang: &str) -> bool {
        self.get(lang).is_some_and(|text| !text.trim().is_empty())
    }

    /// Reads the text for `lang`, falling back to English when it is blank.
    ///
    /// ```
    /// use academy_api::LocalizedText;
    ///
    /// let title = LocalizedText::new().with("en", "Algebra");
    /// assert_eq!(title.localized("ar"), "Algebra");
    /// ```
    pub fn localized(&self, lang: &str) -> &str {
        if self.is_filled(lang) {
            self.get(lang).unwrap_or_default()
        } else {
            self.get("en").unwrap_or_default()
        }
    }
}

// ============================================================================
// Course & Category
// ============================================================================

/// A course offered in the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Document id.
    pub id: Uuid,
    /// Course title.
    pub title: LocalizedText,
    /// Course description.
    #[serde(default)]
    pub description: LocalizedText,
    /// URL-safe identifier, unique across courses.
    pub slug: String,
    /// Category the course is listed under.
    #[serde(default)]
    pub category: Option<Uuid>,
    /// Instructor teaching the course.
    #[serde(default)]
    pub instructor: Option<Uuid>,
    /// Modules in authoring order.
    #[serde(default)]
    pub modules: Vec<Uuid>,
    /// Whether the course can be taken without payment.
    #[serde(default)]
    pub is_free: bool,
    /// Whether the course is visible to students.
    #[serde(default)]
    pub is_published: bool,
    /// Price in the marketplace currency; zero for free courses.
    #[serde(default)]
    pub price: f64,
    /// Free-text difficulty level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Thumbnail image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A category grouping courses and topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document id.
    pub id: Uuid,
    /// Category name.
    pub name: LocalizedText,
    /// Courses listed under this category.
    #[serde(default)]
    pub courses: Vec<Uuid>,
    /// Topics and sub-topics attached to this category.
    #[serde(default)]
    pub topics: Vec<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Appends a course id unless it is already listed.
    ///
    /// Returns `true` if the list changed.
    pub fn attach_course(&mut self, course_id: Uuid) -> bool {
        if self.courses.contains(&course_id) {
            return false;
        }
        self.courses.push(course_id);
        true
    }
}

/// A topic; a topic with a parent is a sub-topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Document id.
    pub id: Uuid,
    /// Topic name.
    pub name: LocalizedText,
    /// Parent topic.
    #[serde(default)]
    pub parent: Option<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Module & Lesson
// ============================================================================

/// What a student must do to complete a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionCriteria {
    /// Every lesson in the module must be completed.
    #[default]
    AllLessons,
    /// The module quiz must be passed.
    QuizPass,
    /// No completion requirement.
    None,
}

/// A module of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Document id.
    pub id: Uuid,
    /// Owning course.
    pub course: Uuid,
    /// Module title.
    pub title: LocalizedText,
    /// Module description.
    #[serde(default)]
    pub description: LocalizedText,
    /// Position within the course, starting at 1.
    pub order: u32,
    /// Completion rule.
    #[serde(default)]
    pub completion_criteria: CompletionCriteria,
    /// Lessons in authoring order.
    #[serde(default)]
    pub lessons: Vec<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A file attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Display name.
    pub name: String,
    /// Download URL.
    pub url: String,
    /// MIME type or extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// File size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Body of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LessonContent {
    /// A hosted video.
    Video {
        /// Video URL.
        url: String,
    },
    /// A written article.
    Article {
        /// Article body per language.
        text: LocalizedText,
    },
    /// Downloadable files.
    Attachments {
        /// The attached files.
        files: Vec<Attachment>,
    },
}

/// A lesson inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Document id.
    pub id: Uuid,
    /// Owning module.
    pub module: Uuid,
    /// Owning course; always the module's course.
    pub course: Uuid,
    /// Lesson title.
    pub title: LocalizedText,
    /// Position within the module, starting at 1.
    pub order: u32,
    /// Lesson body.
    pub content: LessonContent,
    /// Whether the lesson is viewable before purchase.
    #[serde(default)]
    pub is_preview: bool,
    /// Expected duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// User & Instructor
// ============================================================================

/// Role of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// A learner (default).
    #[default]
    Student,
    /// An instructor.
    Instructor,
    /// An administrator.
    Admin,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document id.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique across users.
    pub email: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Professional profile wrapping a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    /// Document id.
    pub id: Uuid,
    /// The backing user account.
    pub user: Uuid,
    /// One-line professional headline.
    #[serde(default)]
    pub headline: LocalizedText,
    /// Longer biography.
    #[serde(default)]
    pub bio: LocalizedText,
    /// Areas of expertise.
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
