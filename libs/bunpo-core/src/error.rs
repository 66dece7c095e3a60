//! Error types for bunpo-core.

use thiserror::Error;

/// Result type alias using SrsError.
pub type Result<T> = std::result::Result<T, SrsError>;

/// Errors surfaced by the scheduling and grading core.
///
/// Low similarity scores and empty typed answers are normal failed reviews,
/// not errors; these variants all indicate a caller bug or malformed data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SrsError {
    #[error("item has no acceptable meanings to grade against")]
    NoAcceptableMeanings,

    #[error("burned items are never submitted for grading")]
    BurnedItem,

    #[error("unknown SRS stage: {0}")]
    UnknownStage(String),

    #[error("unknown lesson status: {0}")]
    UnknownLessonStatus(String),
}
