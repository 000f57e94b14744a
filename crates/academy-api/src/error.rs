//! Error types for the Academy content API.
//!
//! This module defines the error hierarchy for all catalog operations,
//! including configuration loading, payload validation, reference checks
//! across collections, and snapshot persistence.

use std::path::PathBuf;

/// A specialized `Result` type for Academy operations.
pub type Result<T> = std::result::Result<T, AcademyError>;

/// Errors that can occur while serving the content graph.
///
/// Variants are grouped by subsystem. Request-level variants map onto HTTP
/// status codes via [`AcademyError::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum AcademyError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your academy.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// A submitted document failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// The offending field, in wire (camelCase) notation.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A submitted document references a document that does not exist.
    #[error("{kind} '{id}' does not exist")]
    InvalidReference {
        /// Collection the reference points into.
        kind: DocumentKind,
        /// The dangling id.
        id: String,
    },

    /// The requested document does not exist.
    #[error("{kind} not found")]
    NotFound {
        /// Collection that was searched.
        kind: DocumentKind,
        /// The id that was looked up.
        id: String,
    },

    /// The write would violate a uniqueness constraint.
    #[error("{message}")]
    Conflict {
        /// Description of the conflicting value.
        message: String,
    },

    /// The request lacks a valid bearer token.
    #[error("Missing or invalid bearer token")]
    Unauthorized,

    // ========================================================================
    // Persistence Errors
    // ========================================================================
    /// Snapshot file contains malformed JSON that cannot be loaded.
    #[error("Corrupted snapshot file '{path}': {message}\n\nSuggestion: Restore the snapshot from backup or remove it to start with an empty catalog")]
    SnapshotCorrupted {
        /// Path to the corrupted snapshot.
        path: PathBuf,
        /// Description of the corruption.
        message: String,
    },

    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Collections of the content graph, used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// A course.
    Course,
    /// A course category.
    Category,
    /// A topic or sub-topic.
    Topic,
    /// A course module.
    Module,
    /// An instructor profile.
    Instructor,
    /// A user account.
    User,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Course => write!(f, "Course"),
            Self::Category => write!(f, "Category"),
            Self::Topic => write!(f, "Topic"),
            Self::Module => write!(f, "Module"),
            Self::Instructor => write!(f, "Instructor"),
            Self::User => write!(f, "User"),
        }
    }
}

impl AcademyError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `Validation` error for a field.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidReference` error.
    #[must_use]
    pub fn invalid_reference(kind: DocumentKind, id: impl std::fmt::Display) -> Self {
        Self::InvalidReference {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: DocumentKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `SnapshotCorrupted` error.
    #[must_use]
    pub fn snapshot_corrupted(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SnapshotCorrupted {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::InvalidReference { .. } => 400,
            Self::Unauthorized => 401,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::ConfigParseError { .. }
            | Self::ConfigValidationError { .. }
            | Self::SnapshotCorrupted { .. }
            | Self::Io(_)
            | Self::Json(_) => 500,
        }
    }

    /// Returns `true` if the error was caused by the client's request.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
