use std::borrow::Cow;

use thiserror::Error;

/// Top-level error type returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Validation failed for one or more fields.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Target document was not found when performing an operation.
    #[error("document not found")]
    NotFound { entity_id: Option<String> },

    /// Invalid input supplied to a store operation.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Unique constraint violation - the value already exists on another document.
    #[error("unique constraint violation: field '{field}' with value '{value}' already exists on document '{existing_entity_id}'")]
    UniqueConstraintViolation {
        field: String,
        value: String,
        existing_entity_id: String,
    },

    /// Catch-all for unexpected script or serialization failures.
    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_found(entity_id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_id: Some(entity_id.into()),
        }
    }
}

/// Collection of validation issues encountered while preparing a mutation.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Detailed validation failure for a single field or logical path.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used by model validation helpers.
pub type ValidationResult<T> = Result<T, ValidationError>;
