//! Core library for bunpo, a spaced-repetition trainer for Japanese grammar.
//!
//! Provides:
//! - WaniKani-style SRS stage progression and review scheduling
//! - Fuzzy evaluation of typed English meanings (Levenshtein distance)
//! - Shared types (GrammarItem, SrsStage, LessonStatus)
//!
//! Everything here is a pure function of its arguments: the caller supplies
//! the clock and owns persistence.

pub mod error;
pub mod matching;
pub mod srs;
pub mod types;

pub use error::{Result, SrsError};
pub use matching::{
    evaluate, levenshtein_distance, normalized_similarity, Evaluation, PASS_THRESHOLD,
};
pub use srs::{apply_review, transition, Transition};
pub use types::{ExampleSentence, GrammarItem, LessonStatus, SrsStage};
