//! Study-level errors.

use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Reasons a study command is rejected. A rejected command never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("a study is already running")]
    AlreadyStarted,

    #[error("no study has been started")]
    NotStarted,

    #[error("study runtime is no longer running")]
    RuntimeStopped,
}

impl StudyError {
    /// True for errors caused by the caller's input rather than study state.
    pub fn is_validation(&self) -> bool {
        matches!(self, StudyError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_and_displays() {
        let err: StudyError = ValidationError::empty_field("text").into();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "validation failed: Field 'text' cannot be empty"
        );
    }

    #[test]
    fn state_errors_are_not_validation() {
        assert!(!StudyError::AlreadyStarted.is_validation());
        assert!(!StudyError::NotStarted.is_validation());
    }
}
