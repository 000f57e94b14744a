//! Catalog operations over the content graph.
//!
//! This is the controller layer: it validates submissions, resolves
//! references between collections, keeps back-references in step, and
//! expands ("populates") references into the documents they point at for
//! read responses.
//!
//! Every multi-document mutation runs inside one [`Store::write`]
//! transaction, so a course is never inserted without also being listed
//! under its category.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AcademyError, DocumentKind, Result};
use crate::model::{
    Category, CompletionCriteria, Course, Instructor, Lesson, LessonContent, LocalizedText,
    Module, Topic, User, UserRole,
};
use crate::slug::{course_slug, slugify};
use crate::store::{Collections, Store};

// ============================================================================
// Submissions
// ============================================================================

/// Payload for creating a course.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    /// Client-generated id of this logical submission. Resubmitting with the
    /// same id returns the course created the first time.
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    /// Course title; `en` is required.
    pub title: LocalizedText,
    /// Course description.
    #[serde(default)]
    pub description: LocalizedText,
    /// Explicit slug. Derived from `title.en` when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Category to list the course under.
    #[serde(default)]
    pub category: Option<Uuid>,
    /// Teaching instructor.
    #[serde(default)]
    pub instructor: Option<Uuid>,
    /// Free course flag.
    #[serde(default)]
    pub is_free: bool,
    /// Published flag.
    #[serde(default)]
    pub is_published: bool,
    /// Price; ignored for free courses.
    #[serde(default)]
    pub price: Option<f64>,
    /// Difficulty level.
    #[serde(default)]
    pub level: Option<String>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Payload for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    /// Category name; `en` is required.
    pub name: LocalizedText,
    /// Topics to attach.
    #[serde(default)]
    pub topics: Vec<Uuid>,
}

/// Payload for creating a topic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
    /// Topic name; `en` is required.
    pub name: LocalizedText,
    /// Parent topic, for sub-topics.
    #[serde(default)]
    pub parent: Option<Uuid>,
}

/// Payload for creating a module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    /// Owning course.
    pub course: Uuid,
    /// Module title; every required language must be filled.
    pub title: LocalizedText,
    /// Module description.
    #[serde(default)]
    pub description: LocalizedText,
    /// Position in the course. Defaults to after the last module.
    #[serde(default)]
    pub order: Option<u32>,
    /// Completion rule.
    #[serde(default)]
    pub completion_criteria: CompletionCriteria,
}

/// Payload for creating a lesson.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInput {
    /// Owning module.
    pub module: Uuid,
    /// Owning course; must match the module's course when given.
    #[serde(default)]
    pub course: Option<Uuid>,
    /// Lesson title; every required language must be filled.
    pub title: LocalizedText,
    /// Position in the module. Defaults to after the last lesson.
    #[serde(default)]
    pub order: Option<u32>,
    /// Lesson body.
    pub content: LessonContent,
    /// Free preview flag.
    #[serde(default)]
    pub is_preview: bool,
    /// Expected duration.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// Payload for creating a user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Avatar URL.
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
}

/// Payload for creating an instructor profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorInput {
    /// Backing user account.
    pub user: Uuid,
    /// Headline.
    #[serde(default)]
    pub headline: LocalizedText,
    /// Biography.
    #[serde(default)]
    pub bio: LocalizedText,
    /// Areas of expertise.
    #[serde(default)]
    pub expertise: Vec<String>,
}

// ============================================================================
// Populated views
// ============================================================================

/// The user fields exposed through instructor population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User id.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// An instructor with its user populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorView {
    /// Instructor id.
    pub id: Uuid,
    /// The backing user; `None` if the user document is gone.
    pub user: Option<UserSummary>,
    /// Headline.
    pub headline: LocalizedText,
    /// Biography.
    pub bio: LocalizedText,
    /// Areas of expertise.
    pub expertise: Vec<String>,
}

/// Category reference as shown on a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category id.
    pub id: Uuid,
    /// Category name.
    pub name: LocalizedText,
}

/// A course with instructor and category populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    /// Course id.
    pub id: Uuid,
    /// Title.
    pub title: LocalizedText,
    /// Description.
    pub description: LocalizedText,
    /// Slug.
    pub slug: String,
    /// Populated category.
    pub category: Option<CategorySummary>,
    /// Populated instructor.
    pub instructor: Option<InstructorView>,
    /// Module ids in order.
    pub modules: Vec<Uuid>,
    /// Free course flag.
    pub is_free: bool,
    /// Published flag.
    pub is_published: bool,
    /// Price.
    pub price: f64,
    /// Difficulty level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A category with courses (and their instructors) and topics populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    /// Category id.
    pub id: Uuid,
    /// Category name.
    pub name: LocalizedText,
    /// Populated courses, in list order.
    pub courses: Vec<CourseView>,
    /// Populated topics, in list order.
    pub topics: Vec<Topic>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of [`Catalog::create_course`]. Serializes as the course fields plus `replayed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCourse {
    /// The course, populated.
    #[serde(flatten)]
    pub course: CourseView,
    /// `true` if the submission id had already produced this course.
    pub replayed: bool,
}

/// Outcome of [`Catalog::repair_course_categories`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// Number of courses examined.
    pub courses_scanned: usize,
    /// Number of categories whose course list changed.
    pub categories_updated: usize,
    /// Number of course ids appended across all categories.
    pub courses_appended: usize,
    /// Courses whose category id points at no category.
    pub dangling_category_refs: Vec<Uuid>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Controller over the shared [`Store`].
#[derive(Debug, Clone)]
pub struct Catalog {
    store: Arc<Store>,
    required_languages: Vec<String>,
}

impl Catalog {
    /// Creates a catalog over `store`.
    ///
    /// `required_languages` lists the languages that module and lesson
    /// titles must be filled in.
    #[must_use]
    pub fn new(store: Arc<Store>, required_languages: Vec<String>) -> Self {
        Self {
            store,
            required_languages,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    // ----- Courses -----

    /// Lists every course, oldest first, with instructor and category populated.
    pub async fn list_courses(&self) -> Vec<CourseView> {
        self.store
            .read(|data| {
                let mut courses: Vec<&Course> = data.courses.values().collect();
                courses.sort_by_key(|c| (c.created_at, c.id));
                courses.into_iter().map(|c| course_view(data, c)).collect()
            })
            .await
    }

    /// Looks up one course.
    pub async fn get_course(&self, id: Uuid) -> Result<CourseView> {
        self.store
            .read(|data| {
                data.courses
                    .get(&id)
                    .map(|c| course_view(data, c))
                    .ok_or_else(|| AcademyError::not_found(DocumentKind::Course, id))
            })
            .await
    }

    /// Creates a course and lists it under its category in one transaction.
    pub async fn create_course(&self, input: CourseInput) -> Result<CreatedCourse> {
        validate_course(&input)?;
        let now = Utc::now();

        let (course, replayed) = self
            .store
            .write(move |data| {
                if let Some(existing) = input
                    .submission_id
                    .and_then(|sid| data.submissions.get(&sid))
                    .and_then(|course_id| data.courses.get(course_id))
                {
                    return Ok((existing.clone(), true));
                }

                if let Some(category) = input.category {
                    if !data.categories.contains_key(&category) {
                        return Err(AcademyError::invalid_reference(
                            DocumentKind::Category,
                            category,
                        ));
                    }
                }
                if let Some(instructor) = input.instructor {
                    if !data.instructors.contains_key(&instructor) {
                        return Err(AcademyError::invalid_reference(
                            DocumentKind::Instructor,
                            instructor,
                        ));
                    }
                }

                let title_en = input.title.localized("en").to_string();
                let slug = match input.slug.as_deref().map(slugify) {
                    Some(slug) => {
                        if slug_taken(data, &slug) {
                            return Err(AcademyError::conflict(format!(
                                "A course with slug '{slug}' already exists"
                            )));
                        }
                        slug
                    }
                    None => unique_slug(data, &course_slug(&title_en, now.timestamp_millis())),
                };

                let course = Course {
                    id: Uuid::new_v4(),
                    title: input.title,
                    description: input.description,
                    slug,
                    category: input.category,
                    instructor: input.instructor,
                    modules: Vec::new(),
                    is_free: input.is_free,
                    is_published: input.is_published,
                    price: if input.is_free {
                        0.0
                    } else {
                        input.price.unwrap_or(0.0)
                    },
                    level: input.level,
                    thumbnail: input.thumbnail,
                    created_at: now,
                    updated_at: now,
                };

                if let Some(category) = course
                    .category
                    .and_then(|id| data.categories.get_mut(&id))
                {
                    if category.attach_course(course.id) {
                        category.updated_at = now;
                    }
                }
                if let Some(sid) = input.submission_id {
                    data.submissions.insert(sid, course.id);
                }
                data.courses.insert(course.id, course.clone());

                info!(
                    course_id = %course.id,
                    slug = %course.slug,
                    title = %title_en,
                    category = ?course.category,
                    "Course created"
                );
                Ok((course, false))
            })
            .await?;

        if replayed {
            info!(course_id = %course.id, "Replayed course submission");
        }

        let course = self.store.read(|data| course_view(data, &course)).await;
        Ok(CreatedCourse { course, replayed })
    }

    /// Lists every course under its category where it is missing.
    ///
    /// Runs as one transaction, so concurrent runs serialize and a second run
    /// appends nothing.
    pub async fn repair_course_categories(&self) -> Result<RepairReport> {
        let now = Utc::now();
        let report = self
            .store
            .write(move |data| {
                let Collections {
                    courses,
                    categories,
                    ..
                } = data;

                let mut ordered: Vec<&Course> = courses.values().collect();
                ordered.sort_by_key(|c| (c.created_at, c.id));

                let mut report = RepairReport {
                    courses_scanned: ordered.len(),
                    ..RepairReport::default()
                };
                let mut touched = std::collections::BTreeSet::new();

                for course in ordered {
                    let Some(category_id) = course.category else {
                        continue;
                    };
                    match categories.get_mut(&category_id) {
                        Some(category) => {
                            if category.attach_course(course.id) {
                                category.updated_at = now;
                                touched.insert(category_id);
                                report.courses_appended += 1;
                                debug!(
                                    course_id = %course.id,
                                    category_id = %category_id,
                                    "Re-listed course under its category"
                                );
                            }
                        }
                        None => report.dangling_category_refs.push(course.id),
                    }
                }

                report.categories_updated = touched.len();
                Ok(report)
            })
            .await?;

        info!(
            scanned = report.courses_scanned,
            appended = report.courses_appended,
            categories = report.categories_updated,
            dangling = report.dangling_category_refs.len(),
            "Course category repair finished"
        );
        Ok(report)
    }

    /// Lists a course's modules by position.
    pub async fn course_modules(&self, course_id: Uuid) -> Result<Vec<Module>> {
        self.store
            .read(|data| {
                if !data.courses.contains_key(&course_id) {
                    return Err(AcademyError::not_found(DocumentKind::Course, course_id));
                }
                let mut modules: Vec<Module> = data
                    .modules
                    .values()
                    .filter(|m| m.course == course_id)
                    .cloned()
                    .collect();
                modules.sort_by_key(|m| (m.order, m.created_at));
                Ok(modules)
            })
            .await
    }

    // ----- Categories & topics -----

    /// Lists every category, oldest first, fully populated.
    pub async fn list_categories(&self) -> Vec<CategoryView> {
        self.store
            .read(|data| {
                let mut categories: Vec<&Category> = data.categories.values().collect();
                categories.sort_by_key(|c| (c.created_at, c.id));
                categories
                    .into_iter()
                    .map(|c| category_view(data, c))
                    .collect()
            })
            .await
    }

    /// Looks up one category, fully populated.
    pub async fn get_category(&self, id: Uuid) -> Result<CategoryView> {
        self.store
            .read(|data| {
                data.categories
                    .get(&id)
                    .map(|c| category_view(data, c))
                    .ok_or_else(|| AcademyError::not_found(DocumentKind::Category, id))
            })
            .await
    }

    /// Creates an empty category.
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        require_languages("name", &input.name, &["en".to_string()])?;
        let now = Utc::now();

        self.store
            .write(move |data| {
                if let Some(missing) = input
                    .topics
                    .iter()
                    .copied()
                    .find(|t| !data.topics.contains_key(t))
                {
                    return Err(AcademyError::invalid_reference(DocumentKind::Topic, missing));
                }
                let category = Category {
                    id: Uuid::new_v4(),
                    name: input.name,
                    courses: Vec::new(),
                    topics: input.topics,
                    created_at: now,
                    updated_at: now,
                };
                data.categories.insert(category.id, category.clone());
                info!(category_id = %category.id, name = %category.name.localized("en"), "Category created");
                Ok(category)
            })
            .await
    }

    /// Creates a topic or sub-topic.
    pub async fn create_topic(&self, input: TopicInput) -> Result<Topic> {
        require_languages("name", &input.name, &["en".to_string()])?;
        let now = Utc::now();

        self.store
            .write(move |data| {
                if let Some(parent) = input.parent {
                    if !data.topics.contains_key(&parent) {
                        return Err(AcademyError::invalid_reference(DocumentKind::Topic, parent));
                    }
                }
                let topic = Topic {
                    id: Uuid::new_v4(),
                    name: input.name,
                    parent: input.parent,
                    created_at: now,
                };
                data.topics.insert(topic.id, topic.clone());
                Ok(topic)
            })
            .await
    }

    // ----- Modules & lessons -----

    /// Creates a module and appends it to its course.
    pub async fn create_module(&self, input: ModuleInput) -> Result<Module> {
        require_languages("title", &input.title, &self.required_languages)?;
        if input.order == Some(0) {
            return Err(AcademyError::validation("order", "must start at 1"));
        }
        let now = Utc::now();

        self.store
            .write(move |data| {
                let Some(course) = data.courses.get_mut(&input.course) else {
                    return Err(AcademyError::invalid_reference(
                        DocumentKind::Course,
                        input.course,
                    ));
                };

                let order = input.order.unwrap_or_else(|| {
                    next_order(
                        data.modules
                            .values()
                            .filter(|m| m.course == input.course)
                            .map(|m| m.order),
                    )
                });
                let module = Module {
                    id: Uuid::new_v4(),
                    course: input.course,
                    title: input.title,
                    description: input.description,
                    order,
                    completion_criteria: input.completion_criteria,
                    lessons: Vec::new(),
                    created_at: now,
                };

                course.modules.push(module.id);
                course.updated_at = now;
                data.modules.insert(module.id, module.clone());

                info!(module_id = %module.id, course_id = %module.course, order, "Module created");
                Ok(module)
            })
            .await
    }

    /// Lists a module's lessons by position.
    pub async fn module_lessons(&self, module_id: Uuid) -> Result<Vec<Lesson>> {
        self.store
            .read(|data| {
                if !data.modules.contains_key(&module_id) {
                    return Err(AcademyError::not_found(DocumentKind::Module, module_id));
                }
                let mut lessons: Vec<Lesson> = data
                    .lessons
                    .values()
                    .filter(|l| l.module == module_id)
                    .cloned()
                    .collect();
                lessons.sort_by_key(|l| (l.order, l.created_at));
                Ok(lessons)
            })
            .await
    }

    /// Creates a lesson and appends it to its module.
    pub async fn create_lesson(&self, input: LessonInput) -> Result<Lesson> {
        require_languages("title", &input.title, &self.required_languages)?;
        validate_content(&input.content)?;
        if input.order == Some(0) {
            return Err(AcademyError::validation("order", "must start at 1"));
        }
        let now = Utc::now();

        self.store
            .write(move |data| {
                let Some(module) = data.modules.get(&input.module) else {
                    return Err(AcademyError::invalid_reference(
                        DocumentKind::Module,
                        input.module,
                    ));
                };
                let course = module.course;
                if input.course.is_some_and(|c| c != course) {
                    return Err(AcademyError::validation(
                        "course",
                        "must match the module's course",
                    ));
                }

                let order = input.order.unwrap_or_else(|| {
                    next_order(
                        data.lessons
                            .values()
                            .filter(|l| l.module == input.module)
                            .map(|l| l.order),
                    )
                });
                let lesson = Lesson {
                    id: Uuid::new_v4(),
                    module: input.module,
                    course,
                    title: input.title,
                    order,
                    content: input.content,
                    is_preview: input.is_preview,
                    duration_minutes: input.duration_minutes,
                    created_at: now,
                };

                if let Some(module) = data.modules.get_mut(&lesson.module) {
                    module.lessons.push(lesson.id);
                }
                data.lessons.insert(lesson.id, lesson.clone());

                info!(lesson_id = %lesson.id, module_id = %lesson.module, order, "Lesson created");
                Ok(lesson)
            })
            .await
    }

    // ----- Users & instructors -----

    /// Creates a user account.
    pub async fn create_user(&self, input: UserInput) -> Result<User> {
        if input.first_name.trim().is_empty() {
            return Err(AcademyError::validation("firstName", "must not be empty"));
        }
        if input.last_name.trim().is_empty() {
            return Err(AcademyError::validation("lastName", "must not be empty"));
        }
        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AcademyError::validation("email", "must be an email address"));
        }
        let now = Utc::now();

        self.store
            .write(move |data| {
                if data.users.values().any(|u| u.email == email) {
                    return Err(AcademyError::conflict(format!(
                        "A user with email '{email}' already exists"
                    )));
                }
                let user = User {
                    id: Uuid::new_v4(),
                    first_name: input.first_name.trim().to_string(),
                    last_name: input.last_name.trim().to_string(),
                    email,
                    profile_image: input.profile_image,
                    role: input.role,
                    created_at: now,
                };
                data.users.insert(user.id, user.clone());
                Ok(user)
            })
            .await
    }

    /// Creates an instructor profile for an existing user.
    pub async fn create_instructor(&self, input: InstructorInput) -> Result<InstructorView> {
        let now = Utc::now();

        let instructor = self
            .store
            .write(move |data| {
                if !data.users.contains_key(&input.user) {
                    return Err(AcademyError::invalid_reference(DocumentKind::User, input.user));
                }
                if data.instructors.values().any(|i| i.user == input.user) {
                    return Err(AcademyError::conflict(
                        "This user already has an instructor profile",
                    ));
                }
                let instructor = Instructor {
                    id: Uuid::new_v4(),
                    user: input.user,
                    headline: input.headline,
                    bio: input.bio,
                    expertise: input.expertise,
                    created_at: now,
                };
                data.instructors.insert(instructor.id, instructor.clone());
                info!(instructor_id = %instructor.id, user_id = %instructor.user, "Instructor created");
                Ok(instructor)
            })
            .await?;

        Ok(self
            .store
            .read(|data| instructor_view(data, &instructor))
            .await)
    }

    /// Looks up one instructor with its user populated.
    pub async fn get_instructor(&self, id: Uuid) -> Result<InstructorView> {
        self.store
            .read(|data| {
                data.instructors
                    .get(&id)
                    .map(|i| instructor_view(data, i))
                    .ok_or_else(|| AcademyError::not_found(DocumentKind::Instructor, id))
            })
            .await
    }
}

// ============================================================================
// Population
// ============================================================================

fn user_summary(data: &Collections, id: Uuid) -> Option<UserSummary> {
    data.users.get(&id).map(|u| UserSummary {
        id: u.id,
        first_name: u.first_name.clone(),
        last_name: u.last_name.clone(),
        email: u.email.clone(),
        profile_image: u.profile_image.clone(),
    })
}

fn instructor_view(data: &Collections, instructor: &Instructor) -> InstructorView {
    InstructorView {
        id: instructor.id,
        user: user_summary(data, instructor.user),
        headline: instructor.headline.clone(),
        bio: instructor.bio.clone(),
        expertise: instructor.expertise.clone(),
    }
}

fn course_view(data: &Collections, course: &Course) -> CourseView {
    CourseView {
        id: course.id,
        title: course.title.clone(),
        description: course.description.clone(),
        slug: course.slug.clone(),
        category: course
            .category
            .and_then(|id| data.categories.get(&id))
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name.clone(),
            }),
        instructor: course
            .instructor
            .and_then(|id| data.instructors.get(&id))
            .map(|i| instructor_view(data, i)),
        modules: course.modules.clone(),
        is_free: course.is_free,
        is_published: course.is_published,
        price: course.price,
        level: course.level.clone(),
        thumbnail: course.thumbnail.clone(),
        created_at: course.created_at,
        updated_at: course.updated_at,
    }
}

fn category_view(data: &Collections, category: &Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name.clone(),
        courses: category
            .courses
            .iter()
            .filter_map(|id| data.courses.get(id))
            .map(|c| course_view(data, c))
            .collect(),
        topics: category
            .topics
            .iter()
            .filter_map(|id| data.topics.get(id))
            .cloned()
            .collect(),
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn require_languages(field: &str, text: &LocalizedText, languages: &[String]) -> Result<()> {
    match languages.iter().find(|lang| !text.is_filled(lang)) {
        Some(lang) => Err(AcademyError::validation(
            format!("{field}.{lang}"),
            "must not be empty",
        )),
        None => Ok(()),
    }
}

fn validate_course(input: &CourseInput) -> Result<()> {
    require_languages("title", &input.title, &["en".to_string()])?;

    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(AcademyError::validation(
                "price",
                "must be a non-negative number",
            ));
        }
    }
    if input
        .slug
        .as_deref()
        .is_some_and(|slug| slugify(slug).is_empty())
    {
        return Err(AcademyError::validation(
            "slug",
            "must contain at least one letter or digit",
        ));
    }
    Ok(())
}

fn validate_content(content: &LessonContent) -> Result<()> {
    match content {
        LessonContent::Video { url } if url.trim().is_empty() => {
            Err(AcademyError::validation("content.url", "must not be empty"))
        }
        LessonContent::Article { text } if !text.is_filled("en") => Err(
            AcademyError::validation("content.text.en", "must not be empty"),
        ),
        LessonContent::Attachments { files } if files.is_empty() => Err(
            AcademyError::validation("content.files", "must contain at least one file"),
        ),
        LessonContent::Attachments { files } => {
            for (i, file) in files.iter().enumerate() {
                if file.name.trim().is_empty() {
                    return Err(AcademyError::validation(
                        format!("content.files[{i}].name"),
                        "must not be empty",
                    ));
                }
                if file.url.trim().is_empty() {
                    return Err(AcademyError::validation(
                        format!("content.files[{i}].url"),
                        "must not be empty",
                    ));
                }
            }
            Ok(())
        }
        LessonContent::Video { .. } | LessonContent::Article { .. } => Ok(()),
    }
}

fn slug_taken(data: &Collections, slug: &str) -> bool {
    data.courses.values().any(|c| c.slug == slug)
}

/// Returns `base`, or `base-2`, `base-3`, ... for the first free slug.
fn unique_slug(data: &Collections, base: &str) -> String {
    if !slug_taken(data, base) {
        return base.to_string();
    }
    (2_u32..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !slug_taken(data, candidate))
        .unwrap_or_else(|| base.to_string())
}

fn next_order(existing: impl Iterator<Item = u32>) -> u32 {
    existing.max().map_or(1, |max| max.saturating_add(1))
}
