//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Grade value outside `again`, `normal`, `familiar`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid grade: {value}")]
pub struct InvalidGradeError {
    pub value: String,
}

impl InvalidGradeError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Errors raised while driving a review session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no cards due for review")]
    NothingDue,

    #[error("session already finished after {graded} gradings")]
    Finished { graded: usize },

    #[error(transparent)]
    InvalidGrade(#[from] InvalidGradeError),
}
