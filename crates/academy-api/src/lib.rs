//! Academy content API
//!
//! Course catalog backend for a bilingual e-learning marketplace: courses,
//! categories, topics, modules, lessons and instructors, served over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod slug;
pub mod store;

pub use api::{create_router, ApiResponse, AppState, HealthStatus};
pub use catalog::{
    Catalog, CategoryInput, CategorySummary, CategoryView, CourseInput, CourseView, CreatedCourse,
    InstructorInput, InstructorView, LessonInput, ModuleInput, RepairReport, TopicInput,
    UserInput, UserSummary,
};
pub use config::Config;
pub use error::{AcademyError, DocumentKind, Result};
pub use model::{
    Attachment, Category, CompletionCriteria, Course, Instructor, Lesson, LessonContent,
    LocalizedText, Module, Topic, User, UserRole,
};
pub use store::{Collections, Store, SNAPSHOT_VERSION};
