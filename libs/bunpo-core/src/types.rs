//! Core types for the grammar trainer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SrsError;

/// SRS progression stage.
///
/// Fixed nine-step ladder: Apprentice I through Burned. The display names
/// double as the storage representation, so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SrsStage {
    #[serde(rename = "Apprentice I")]
    ApprenticeI,
    #[serde(rename = "Apprentice II")]
    ApprenticeII,
    #[serde(rename = "Apprentice III")]
    ApprenticeIII,
    #[serde(rename = "Apprentice IV")]
    ApprenticeIV,
    #[serde(rename = "Guru I")]
    GuruI,
    #[serde(rename = "Guru II")]
    GuruII,
    Master,
    Enlightened,
    Burned,
}

impl SrsStage {
    /// All stages in progression order.
    pub const ALL: [SrsStage; 9] = [
        Self::ApprenticeI,
        Self::ApprenticeII,
        Self::ApprenticeIII,
        Self::ApprenticeIV,
        Self::GuruI,
        Self::GuruII,
        Self::Master,
        Self::Enlightened,
        Self::Burned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApprenticeI => "Apprentice I",
            Self::ApprenticeII => "Apprentice II",
            Self::ApprenticeIII => "Apprentice III",
            Self::ApprenticeIV => "Apprentice IV",
            Self::GuruI => "Guru I",
            Self::GuruII => "Guru II",
            Self::Master => "Master",
            Self::Enlightened => "Enlightened",
            Self::Burned => "Burned",
        }
    }

    /// Burned items are terminal and never reviewed again.
    pub fn is_burned(self) -> bool {
        matches!(self, Self::Burned)
    }
}

impl Default for SrsStage {
    fn default() -> Self {
        Self::ApprenticeI
    }
}

impl fmt::Display for SrsStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SrsStage {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| SrsError::UnknownStage(s.to_string()))
    }
}

/// Lesson pipeline status.
///
/// Imported items sit in `NotStarted` until the learner starts their lesson,
/// which makes them `Available` for immediate review. The first graded review
/// moves them to `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LessonStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Available,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl LessonStatus {
    pub const ALL: [LessonStatus; 3] = [Self::NotStarted, Self::Available, Self::InProgress];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Available => "Available",
            Self::InProgress => "In Progress",
        }
    }
}

impl Default for LessonStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| SrsError::UnknownLessonStatus(s.to_string()))
    }
}

/// Example sentence pair attached to a grammar item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub japanese: String,
    pub english: String,
}

/// A grammar point under study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarItem {
    pub id: i64,
    /// The grammar pattern itself, e.g. "～てしまう".
    pub grammar: String,
    /// Kana reading of the pattern.
    pub reading: String,
    /// Short usage note (which forms it attaches to, register, etc.).
    pub usage: String,
    /// Canonical English meanings, in declaration order. Must be non-empty
    /// for any item offered for review; variants may be packed into one
    /// entry with `;` or `/` delimiters.
    pub meanings: Vec<String>,
    pub examples: Vec<ExampleSentence>,
    pub note: String,
    pub learned_at: Option<DateTime<Utc>>,
    pub stage: SrsStage,
    pub lesson_status: LessonStatus,
    /// When the item next comes up for review. `None` for items whose lesson
    /// has not started yet, and always `None` once Burned.
    pub due_at: Option<DateTime<Utc>>,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl GrammarItem {
    /// New, unreviewed item at the bottom of the ladder.
    pub fn new(grammar: impl Into<String>, meanings: Vec<String>) -> Self {
        Self {
            id: 0,
            grammar: grammar.into(),
            reading: String::new(),
            usage: String::new(),
            meanings,
            examples: Vec::new(),
            note: String::new(),
            learned_at: None,
            stage: SrsStage::ApprenticeI,
            lesson_status: LessonStatus::NotStarted,
            due_at: None,
            correct_answers: 0,
            incorrect_answers: 0,
            last_reviewed: None,
        }
    }

    /// Whether the item is due for review at `now`. Burned items never are.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.stage.is_burned() {
            return false;
        }
        self.due_at.is_some_and(|due| due <= now)
    }

    /// Lifetime answer accuracy, if the item has been reviewed at all.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.correct_answers + self.incorrect_answers;
        if total == 0 {
            return None;
        }
        Some(f64::from(self.correct_answers) / f64::from(total))
    }
}
