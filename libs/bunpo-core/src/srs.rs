//! SRS stage progression and review scheduling.
//!
//! A deterministic nine-state machine: a passed review advances exactly one
//! stage, a failed review resets to Apprentice I, and Burned is absorbing.
//! The interval attached to the stage an item is *leaving* determines how far
//! ahead the next review lands.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SrsError};
use crate::types::{GrammarItem, LessonStatus, SrsStage};

impl SrsStage {
    /// Stage reached after a passed review. Burned absorbs.
    pub fn next(self) -> SrsStage {
        match self {
            Self::ApprenticeI => Self::ApprenticeII,
            Self::ApprenticeII => Self::ApprenticeIII,
            Self::ApprenticeIII => Self::ApprenticeIV,
            Self::ApprenticeIV => Self::GuruI,
            Self::GuruI => Self::GuruII,
            Self::GuruII => Self::Master,
            Self::Master => Self::Enlightened,
            Self::Enlightened => Self::Burned,
            Self::Burned => Self::Burned,
        }
    }

    /// Time until the next review after passing a review from this stage.
    /// `None` for Burned: burned items are never scheduled again.
    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::ApprenticeI => Some(Duration::hours(4)),
            Self::ApprenticeII => Some(Duration::hours(8)),
            Self::ApprenticeIII => Some(Duration::days(1)),
            Self::ApprenticeIV => Some(Duration::days(2)),
            Self::GuruI => Some(Duration::weeks(1)),
            Self::GuruII => Some(Duration::weeks(2)),
            Self::Master => Some(Duration::days(30)),
            Self::Enlightened => Some(Duration::days(120)),
            Self::Burned => None,
        }
    }
}

/// Result of scheduling an item after a graded review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub stage: SrsStage,
    /// Next review time. `None` once the item reaches Burned.
    pub due_at: Option<DateTime<Utc>>,
}

/// Compute the next stage and due time for a graded review.
///
/// Pure function of its arguments. Grading an already-Burned item is a caller
/// bug and returns [`SrsError::BurnedItem`].
pub fn transition(current: SrsStage, now: DateTime<Utc>, passed: bool) -> Result<Transition> {
    if current.is_burned() {
        return Err(SrsError::BurnedItem);
    }

    let (stage, due_at) = if passed {
        let next = current.next();
        if next.is_burned() {
            (next, None)
        } else {
            (next, current.interval().map(|iv| now + iv))
        }
    } else {
        let reset = SrsStage::ApprenticeI;
        (reset, reset.interval().map(|iv| now + iv))
    };

    Ok(Transition { stage, due_at })
}

/// Apply a graded review to an item.
///
/// Runs [`transition`] and writes the outcome back, bumping the
/// correct/incorrect counters and promoting `Available` items to
/// `InProgress` on their first review. The counters are bookkeeping only and
/// never influence the transition itself.
pub fn apply_review(item: &mut GrammarItem, now: DateTime<Utc>, passed: bool) -> Result<Transition> {
    let result = transition(item.stage, now, passed)?;

    if passed {
        item.correct_answers += 1;
    } else {
        item.incorrect_answers += 1;
    }
    if item.lesson_status == LessonStatus::Available {
        item.lesson_status = LessonStatus::InProgress;
    }
    item.stage = result.stage;
    item.due_at = result.due_at;
    item.last_reviewed = Some(now);

    Ok(result)
}
