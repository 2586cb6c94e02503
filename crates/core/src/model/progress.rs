use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExerciseKind, UnitId};

/// Minimum percentage that counts as mastering an exercise.
pub const PASS_THRESHOLD: u8 = 70;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("score must be between 0 and 100, got {0}")]
    ScoreOutOfRange(u8),
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole);
    let rounded = (part * 200 + whole) / (whole * 2);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── ATTEMPT RECORD ────────────────────────────────────────────────────────────
//

/// Latest attempt of one exercise kind in one unit.
///
/// Only the newest attempt survives; every write replaces the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseAttemptRecord {
    pub score: u8,
    pub completed: bool,
    #[serde(rename = "date")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "unitId", default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<UnitId>,
    #[serde(rename = "exerciseType", default, skip_serializing_if = "Option::is_none")]
    pub exercise_kind: Option<ExerciseKind>,
}

impl ExerciseAttemptRecord {
    /// The record reported for an exercise that was never attempted.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            score: 0,
            completed: false,
            completed_at: None,
            unit_id: None,
            exercise_kind: None,
        }
    }

    /// Record a new attempt.
    ///
    /// `completed` ends up true when either the caller forces it or the
    /// score reaches [`PASS_THRESHOLD`].
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreOutOfRange` for scores above 100.
    pub fn new(
        unit_id: UnitId,
        kind: ExerciseKind,
        score: u8,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<Self, ProgressError> {
        if score > 100 {
            return Err(ProgressError::ScoreOutOfRange(score));
        }
        Ok(Self {
            score,
            completed: completed || score >= PASS_THRESHOLD,
            completed_at: Some(at),
            unit_id: Some(unit_id),
            exercise_kind: Some(kind),
        })
    }

    /// A zero score counts as not attempted, even when the record is dated.
    #[must_use]
    pub fn is_attempted(&self) -> bool {
        self.score > 0
    }

    #[must_use]
    pub fn status(&self) -> ExerciseStatus {
        if self.completed {
            ExerciseStatus::Completed
        } else if self.score > 0 {
            ExerciseStatus::Partial
        } else {
            ExerciseStatus::Pending
        }
    }
}

impl Default for ExerciseAttemptRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Coarse state of an exercise, used to style its entry on the unit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStatus {
    Completed,
    Partial,
    Pending,
}

//
// ─── UNIT SUMMARY ──────────────────────────────────────────────────────────────
//

/// Aggregate over the canonical exercise kinds of a unit. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitProgressSummary {
    pub average_score: u8,
    pub completion_rate: u8,
    pub completed_count: usize,
    pub total_exercises: usize,
}

impl UnitProgressSummary {
    /// Summarize one record per canonical kind.
    ///
    /// The average and the completed count only cover attempted exercises
    /// (score above zero); the completion rate is measured against all of
    /// [`ExerciseKind::ALL`].
    #[must_use]
    pub fn from_records(records: &[ExerciseAttemptRecord]) -> Self {
        let total_exercises = ExerciseKind::ALL.len();
        let attempted: Vec<_> = records.iter().filter(|r| r.is_attempted()).collect();
        let score_sum: usize = attempted.iter().map(|r| usize::from(r.score)).sum();
        let completed_count = attempted.iter().filter(|r| r.completed).count();

        Self {
            average_score: if attempted.is_empty() {
                0
            } else {
                percentage(score_sum, attempted.len() * 100)
            },
            completion_rate: percentage(completed_count, total_exercises),
            completed_count,
            total_exercises,
        }
    }
}
