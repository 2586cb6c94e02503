//! State machine for one timed multiple-choice attempt.
//!
//! The machine is pure: it never sleeps or spawns. The countdown is advanced
//! by [`ExerciseSession::tick`], which the services layer drives from a
//! cancellable timer task.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{ExerciseKind, PASS_THRESHOLD, Question, UnitId, percentage};

/// Time units (seconds) a learner gets per question.
pub const QUESTION_TIME_BUDGET: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    NoQuestions,

    #[error("question time budget must be > 0")]
    InvalidTimeBudget,

    #[error("session has already started")]
    AlreadyStarted,

    #[error("no question is being presented")]
    NotPresenting,

    #[error("current question has not been answered yet")]
    NotAnswered,

    #[error("session is finished")]
    Finished,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Presenting { index: usize },
    Answered { index: usize },
    Completed,
    Aborted,
}

/// Mutable bookkeeping of an attempt.
///
/// `correct + wrong` always equals the number of `answered` flags set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub current: usize,
    pub correct: usize,
    pub wrong: usize,
    pub answered: Vec<bool>,
    pub remaining_secs: u32,
}

impl SessionState {
    fn new(question_count: usize) -> Self {
        Self {
            current: 0,
            correct: 0,
            wrong: 0,
            answered: vec![false; question_count],
            remaining_secs: 0,
        }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.correct + self.wrong
    }
}

/// What happened when a question left `Presenting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    /// `None` when the countdown ran out.
    pub selected: Option<String>,
    /// Revealed to the learner in both cases.
    pub correct_answer: String,
    pub is_correct: bool,
}

impl AnswerOutcome {
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.selected.is_none()
    }
}

/// Final tally of a completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub unit_id: UnitId,
    pub kind: ExerciseKind,
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
    pub percentage: u8,
    pub started_at: DateTime<Utc>,
}

impl SessionResult {
    /// At or above the pass threshold; the UI celebrates these.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage >= PASS_THRESHOLD
    }
}

/// Tally of an attempt abandoned before its last question was continued past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteResult {
    pub unit_id: UnitId,
    pub kind: ExerciseKind,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
    /// Correct answers measured against the whole quiz.
    pub percentage: u8,
}

/// Result of continuing past an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Completed(SessionResult),
}

/// Aggregated view of the attempt for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub current: usize,
    pub remaining_secs: u32,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at an exercise.
#[derive(Debug, Clone)]
pub struct ExerciseSession {
    unit_id: UnitId,
    kind: ExerciseKind,
    questions: Vec<Question>,
    phase: SessionPhase,
    state: SessionState,
    time_budget: u32,
    started_at: DateTime<Utc>,
}

impl ExerciseSession {
    /// Create an idle session over generated questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` if `questions` is empty.
    pub fn new(
        unit_id: UnitId,
        kind: ExerciseKind,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        let state = SessionState::new(questions.len());
        Ok(Self {
            unit_id,
            kind,
            questions,
            phase: SessionPhase::Idle,
            state,
            time_budget: QUESTION_TIME_BUDGET,
            started_at,
        })
    }

    /// Override the per-question countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTimeBudget` for a zero budget.
    pub fn with_time_budget(mut self, secs: u32) -> Result<Self, SessionError> {
        if secs == 0 {
            return Err(SessionError::InvalidTimeBudget);
        }
        self.time_budget = secs;
        Ok(self)
    }

    #[must_use]
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    #[must_use]
    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The question on screen, answered or not.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Presenting { index } | SessionPhase::Answered { index } => {
                self.questions.get(index)
            }
            _ => None,
        }
    }

    /// True while a countdown should be running.
    #[must_use]
    pub fn is_presenting(&self) -> bool {
        matches!(self.phase, SessionPhase::Presenting { .. })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Completed | SessionPhase::Aborted)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let answered = self.state.answered_count();
        SessionProgress {
            total: self.total(),
            answered,
            remaining: self.total().saturating_sub(answered),
            current: self.state.current,
            remaining_secs: self.state.remaining_secs,
            is_complete: self.phase == SessionPhase::Completed,
        }
    }

    /// Present the first question and start its countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless the session is idle.
    pub fn start(&mut self) -> Result<&Question, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.present(0);
        Ok(&self.questions[0])
    }

    /// Record the learner's choice for the presented question.
    ///
    /// Only the first answer counts: once answered, further calls return
    /// `Ok(None)` without touching the tally.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotPresenting` before start and after the session ends.
    pub fn answer(&mut self, selected: &str) -> Result<Option<AnswerOutcome>, SessionError> {
        match self.phase {
            SessionPhase::Presenting { index } => {
                Ok(Some(self.settle(index, Some(selected.to_owned()))))
            }
            SessionPhase::Answered { .. } => Ok(None),
            _ => Err(SessionError::NotPresenting),
        }
    }

    /// Advance the countdown by one unit.
    ///
    /// When it reaches zero the question is scored wrong and the correct
    /// option is revealed through the returned outcome. No-op outside
    /// `Presenting`.
    pub fn tick(&mut self) -> Option<AnswerOutcome> {
        let SessionPhase::Presenting { index } = self.phase else {
            return None;
        };
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        if self.state.remaining_secs == 0 {
            Some(self.settle(index, None))
        } else {
            None
        }
    }

    /// Continue past an answered question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswered` while the question is still open,
    /// and `SessionError::Finished` / `NotPresenting` outside the question loop.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        match self.phase {
            SessionPhase::Answered { index } => {
                let next = index + 1;
                if next < self.questions.len() {
                    self.present(next);
                    Ok(Advance::Next { index: next })
                } else {
                    self.phase = SessionPhase::Completed;
                    self.state.current = next;
                    self.state.remaining_secs = 0;
                    Ok(Advance::Completed(self.result()))
                }
            }
            SessionPhase::Presenting { .. } => Err(SessionError::NotAnswered),
            SessionPhase::Completed | SessionPhase::Aborted => Err(SessionError::Finished),
            SessionPhase::Idle => Err(SessionError::NotPresenting),
        }
    }

    /// Tear the session down.
    ///
    /// Returns the partial tally when at least one question was shown; a
    /// session that never started, or already ended, yields `None`.
    pub fn abort(&mut self) -> Option<IncompleteResult> {
        match self.phase {
            SessionPhase::Presenting { .. } | SessionPhase::Answered { .. } => {
                self.phase = SessionPhase::Aborted;
                self.state.remaining_secs = 0;
                Some(IncompleteResult {
                    unit_id: self.unit_id,
                    kind: self.kind,
                    answered: self.state.answered_count(),
                    correct: self.state.correct,
                    wrong: self.state.wrong,
                    total: self.total(),
                    percentage: percentage(self.state.correct, self.total()),
                })
            }
            SessionPhase::Idle => {
                self.phase = SessionPhase::Aborted;
                None
            }
            SessionPhase::Completed | SessionPhase::Aborted => None,
        }
    }

    fn present(&mut self, index: usize) {
        self.phase = SessionPhase::Presenting { index };
        self.state.current = index;
        self.state.remaining_secs = self.time_budget;
    }

    fn settle(&mut self, index: usize, selected: Option<String>) -> AnswerOutcome {
        let question = &self.questions[index];
        let is_correct = selected.as_deref().is_some_and(|s| question.is_correct(s));
        let correct_answer = question.correct.clone();

        if is_correct {
            self.state.correct += 1;
        } else {
            self.state.wrong += 1;
        }
        self.state.answered[index] = true;
        self.phase = SessionPhase::Answered { index };

        AnswerOutcome {
            index,
            selected,
            correct_answer,
            is_correct,
        }
    }

    fn result(&self) -> SessionResult {
        SessionResult {
            unit_id: self.unit_id,
            kind: self.kind,
            correct: self.state.correct,
            wrong: self.state.wrong,
            total: self.total(),
            percentage: percentage(self.state.correct, self.total()),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(n: usize) -> Question {
        Question {
            text: format!("Q{n}"),
            options: vec![format!("right{n}"), format!("wrong{n}")],
            correct: format!("right{n}"),
            kind: ExerciseKind::UzToEng,
        }
    }

    fn session(n: usize) -> ExerciseSession {
        let questions = (0..n).map(question).collect();
        ExerciseSession::new(UnitId::new(1), ExerciseKind::UzToEng, questions, fixed_now()).unwrap()
    }

    fn assert_tally_consistent(session: &ExerciseSession) {
        let flags = session.state().answered.iter().filter(|f| **f).count();
        assert_eq!(session.state().answered_count(), flags);
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let err = ExerciseSession::new(UnitId::new(1), ExerciseKind::Definition, Vec::new(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SessionError::NoQuestions);
    }

    #[test]
    fn all_correct_scores_hundred() {
        let mut s = session(5);
        s.start().unwrap();
        let mut result = None;
        for i in 0..5 {
            let outcome = s.answer(&format!("right{i}")).unwrap().unwrap();
            assert!(outcome.is_correct);
            assert_tally_consistent(&s);
            if let Advance::Completed(r) = s.advance().unwrap() {
                result = Some(r);
            }
        }
        let result = result.expect("session completed");
        assert_eq!(result.correct, 5);
        assert_eq!(result.wrong, 0);
        assert_eq!(result.percentage, 100);
        assert!(result.passed());
        assert_eq!(s.phase(), SessionPhase::Completed);
        assert!(s.progress().is_complete);
    }

    #[test]
    fn only_first_answer_counts() {
        let mut s = session(2);
        s.start().unwrap();
        let first = s.answer("wrong0").unwrap().unwrap();
        assert!(!first.is_correct);
        assert_eq!(first.correct_answer, "right0");

        assert_eq!(s.answer("right0").unwrap(), None);
        assert_eq!(s.state().correct, 0);
        assert_eq!(s.state().wrong, 1);
    }

    #[test]
    fn cannot_continue_before_answering() {
        let mut s = session(2);
        assert_eq!(s.advance().unwrap_err(), SessionError::NotPresenting);
        s.start().unwrap();
        assert_eq!(s.advance().unwrap_err(), SessionError::NotAnswered);
        assert_eq!(s.start().unwrap_err(), SessionError::AlreadyStarted);
    }

    #[test]
    fn countdown_expiry_scores_wrong_and_reveals() {
        let mut s = session(2).with_time_budget(3).unwrap();
        s.start().unwrap();
        assert_eq!(s.tick(), None);
        assert_eq!(s.tick(), None);
        let outcome = s.tick().expect("timed out");
        assert!(outcome.timed_out());
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_answer, "right0");
        assert_eq!(s.phase(), SessionPhase::Answered { index: 0 });

        assert_eq!(s.tick(), None);
        assert_eq!(s.answer("right0").unwrap(), None);
        assert_eq!(s.state().wrong, 1);
        assert_tally_consistent(&s);
    }

    #[test]
    fn next_question_gets_fresh_countdown() {
        let mut s = session(2);
        s.start().unwrap();
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.progress().remaining_secs, QUESTION_TIME_BUDGET - 10);
        s.answer("right0").unwrap();
        assert_eq!(s.advance().unwrap(), Advance::Next { index: 1 });
        assert_eq!(s.progress().remaining_secs, QUESTION_TIME_BUDGET);
        assert_eq!(s.current_question().unwrap().text, "Q1");
    }

    #[test]
    fn percentage_rounds_and_stays_in_range() {
        let mut s = session(3);
        s.start().unwrap();
        s.answer("right0").unwrap();
        s.advance().unwrap();
        s.answer("nope").unwrap();
        s.advance().unwrap();
        s.answer("nope").unwrap();
        let Advance::Completed(result) = s.advance().unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(result.correct + result.wrong, result.total);
        assert_eq!(result.percentage, 33);
        assert!(!result.passed());
        assert_eq!(s.advance().unwrap_err(), SessionError::Finished);
    }

    #[test]
    fn abort_reports_partial_progress() {
        let mut s = session(5);
        s.start().unwrap();
        s.answer("right0").unwrap();
        s.advance().unwrap();
        s.answer("wrong1").unwrap();

        let incomplete = s.abort().expect("questions were shown");
        assert_eq!(incomplete.answered, 2);
        assert_eq!(incomplete.total, 5);
        assert_eq!(incomplete.correct, 1);
        assert_eq!(incomplete.percentage, 20);
        assert_eq!(s.phase(), SessionPhase::Aborted);
        assert!(!s.is_presenting());

        assert_eq!(s.abort(), None);
        assert_eq!(s.answer("right2").unwrap_err(), SessionError::NotPresenting);
        assert_eq!(s.tick(), None);
    }

    #[test]
    fn abort_before_start_reports_nothing() {
        let mut s = session(3);
        assert_eq!(s.abort(), None);
        assert_eq!(s.phase(), SessionPhase::Aborted);
    }

    #[test]
    fn zero_time_budget_is_rejected() {
        assert_eq!(
            session(1).with_time_budget(0).unwrap_err(),
            SessionError::InvalidTimeBudget
        );
    }
}
