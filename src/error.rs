//! Error types.
//!
//! Fatal conditions are [`TimetableError`]s and abort a run before (or
//! between) stage commits. Per-item failures are not errors: they are
//! reported as [`Unresolved`](crate::outcome::Unresolved) entries and the
//! run continues.

use crate::validation::ValidationError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Entity store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Institute '{0}' is locked by another run")]
    Busy(String),

    #[error("Store lock poisoned: {0}")]
    Poisoned(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// Required input missing or out of range. Raised before any write.
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Foundational data (faculty or sections) absent for the institute.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<Vec<ValidationError>> for TimetableError {
    fn from(errors: Vec<ValidationError>) -> Self {
        TimetableError::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = TimetableError::from(vec![
            ValidationError::new(ValidationErrorKind::MissingField, "institute is required"),
            ValidationError::new(ValidationErrorKind::OutOfRange, "working days must be 5 or 6"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("institute is required"));
        assert!(msg.contains("working days must be 5 or 6"));
    }

    #[test]
    fn test_store_error_converts() {
        let err: TimetableError = StoreError::Busy("iiit".into()).into();
        assert_eq!(err.to_string(), "Institute 'iiit' is locked by another run");
    }
}
