//! Class session error types.

use thiserror::Error;

use crate::domain::foundation::{
    ClassId, ClassSessionId, DomainError, ErrorCode, FileId, ValidationError,
};

/// Errors surfaced by class session commands and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassSessionError {
    /// Session does not exist or was deleted.
    #[error("Class session not found: {0}")]
    NotFound(ClassSessionId),

    #[error("Class not found: {0}")]
    ClassNotFound(ClassId),

    /// Material is not attached to the session.
    #[error("Material not found: {0}")]
    MaterialNotFound(FileId),

    #[error("Permission denied")]
    Forbidden,

    /// Session is not in a state that allows the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input rejected before any event was appended.
    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// No content update precedes the failed one.
    #[error("No prior update found for class session: {0}")]
    NoPriorUpdate(ClassSessionId),

    #[error("Timed out waiting for lock on class session: {0}")]
    LockTimeout(ClassSessionId),

    /// Storage or collaborator failure.
    #[error("Error: {0}")]
    Infrastructure(String),
}

impl ClassSessionError {
    pub fn not_found(id: ClassSessionId) -> Self {
        ClassSessionError::NotFound(id)
    }
    pub fn class_not_found(id: ClassId) -> Self {
        ClassSessionError::ClassNotFound(id)
    }
    pub fn forbidden() -> Self {
        ClassSessionError::Forbidden
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClassSessionError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClassSessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ClassSessionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ClassSessionError::NotFound(_) => ErrorCode::ClassSessionNotFound,
            ClassSessionError::ClassNotFound(_) => ErrorCode::ClassNotFound,
            ClassSessionError::MaterialNotFound(_) => ErrorCode::MaterialNotFound,
            ClassSessionError::Forbidden => ErrorCode::Forbidden,
            ClassSessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            ClassSessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ClassSessionError::NoPriorUpdate(_) => ErrorCode::EventStreamNotFound,
            ClassSessionError::LockTimeout(_) => ErrorCode::LockTimeout,
            ClassSessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True for the not-found family, including a missing revert boundary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClassSessionError::NotFound(_)
                | ClassSessionError::ClassNotFound(_)
                | ClassSessionError::MaterialNotFound(_)
                | ClassSessionError::NoPriorUpdate(_)
        )
    }
}

impl From<ValidationError> for ClassSessionError {
    fn from(err: ValidationError) -> Self {
        ClassSessionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ClassSessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden => ClassSessionError::Forbidden,
            ErrorCode::InvalidStateTransition => ClassSessionError::InvalidState(err.message),
            ErrorCode::ValidationFailed => ClassSessionError::ValidationFailed {
                field: err.field.unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => ClassSessionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ClassSessionError> for DomainError {
    fn from(err: ClassSessionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
