use chrono::{DateTime, Utc};
use els_core::model::{ExerciseKind, Learner, PASS_THRESHOLD, UnitId, percentage};
use els_core::session::{IncompleteResult, SessionResult};
use serde::{Deserialize, Serialize};

const HEADER: &str = "📘 *ELS - English Through Reading*";
const PASSED_LINE: &str = "🎉 *Congratulations! Keep up the good work!*";
const FAILED_LINE: &str = "📝 *Keep practicing! You can do better next time!*";

/// Payload delivered to the result channel for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub student_name: String,
    pub student_surname: String,
    pub group: String,
    pub unit_id: UnitId,
    /// Storage label of the exercise, suffixed with ` (Incomplete)` for aborted attempts.
    pub exercise_type: String,
    pub score: u8,
    pub correct: usize,
    pub total: usize,
    pub wrong: usize,
    /// Markdown text shown in the channel.
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ResultSummary {
    /// Summary of a finished attempt.
    #[must_use]
    pub fn completed(learner: &Learner, result: &SessionResult, at: DateTime<Utc>) -> Self {
        Self::build(
            learner,
            result.unit_id,
            result.kind.as_str().to_owned(),
            &test_name(result.unit_id, result.kind, false),
            (result.correct, result.total, result.wrong),
            at,
        )
    }

    /// Summary of an attempt the learner walked away from.
    #[must_use]
    pub fn incomplete(
        learner: &Learner,
        result: &IncompleteResult,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self::build(
            learner,
            result.unit_id,
            format!("{} (Incomplete)", result.kind),
            &test_name(result.unit_id, result.kind, true),
            (result.correct, result.total, result.wrong),
            at,
        );
        summary.message.push_str(&format!(
            "\n\n⚠️ Note: {reason} - Test was not completed (answered {}/{} questions)",
            result.answered, result.total
        ));
        summary
    }

    /// Summary of a free-text grammar example, which always counts as one correct answer.
    #[must_use]
    pub fn grammar_submission(
        learner: &Learner,
        unit_id: UnitId,
        example: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self::build(
            learner,
            unit_id,
            ExerciseKind::Grammar.as_str().to_owned(),
            &test_name(unit_id, ExerciseKind::Grammar, false),
            (1, 1, 0),
            at,
        );
        summary
            .message
            .push_str(&format!("\n📝 Student's Example: {example}"));
        summary
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.score >= PASS_THRESHOLD
    }

    fn build(
        learner: &Learner,
        unit_id: UnitId,
        exercise_type: String,
        test_name: &str,
        (correct, total, wrong): (usize, usize, usize),
        at: DateTime<Utc>,
    ) -> Self {
        let score = percentage(correct, total);
        let passed = score >= PASS_THRESHOLD;
        let (mark, status) = if passed {
            ("✅", "PASSED")
        } else {
            ("❌", "FAILED")
        };

        let lines = [
            HEADER.to_owned(),
            String::new(),
            format!(
                "🧑‍🎓 *Student:* {} {}",
                learner.name(),
                learner.surname()
            ),
            format!("👥 *Group:* {}", learner.group()),
            format!("📅 *Date:* {}", at.format("%Y-%m-%d")),
            format!("⏰ *Time:* {}", at.format("%H:%M:%S UTC")),
            String::new(),
            "📊 *Test Results:*".to_owned(),
            format!("   Test: {test_name}"),
            format!("   Status: {mark} {status}"),
            format!("   Score: {correct}/{total} ({score}%)"),
            format!("   ✅ Correct: {correct}"),
            format!("   ❌ Wrong: {wrong}"),
            String::new(),
            (if passed { PASSED_LINE } else { FAILED_LINE }).to_owned(),
        ];

        Self {
            student_name: learner.name().to_owned(),
            student_surname: learner.surname().to_owned(),
            group: learner.group().to_owned(),
            unit_id,
            exercise_type,
            score,
            correct,
            total,
            wrong,
            message: lines.join("\n"),
            timestamp: at,
        }
    }
}

fn test_name(unit_id: UnitId, kind: ExerciseKind, incomplete: bool) -> String {
    let suffix = if incomplete { " (Incomplete)" } else { "" };
    format!("Unit {unit_id} - {}{suffix}", kind.display_name())
}
