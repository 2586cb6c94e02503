use els_core::Clock;
use els_core::model::{Learner, Question};
use els_core::session::{
    AnswerOutcome, ExerciseSession, IncompleteResult, SessionPhase, SessionProgress,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::QuizError;
use crate::reporting::{ReportDispatcher, ResultSummary};
use crate::timer::{QuestionTimer, Tick};

/// Reason attached to the incomplete report of a quiz dropped mid-way.
pub const DROPPED_REASON: &str = "Quiz closed";

/// What one countdown tick did to the presented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    Countdown { remaining_secs: u32 },
    TimedOut(AnswerOutcome),
}

/// An aborted attempt and its report delivery.
#[derive(Debug)]
pub struct AbortedQuiz {
    pub result: IncompleteResult,
    pub report: Option<JoinHandle<()>>,
}

/// A running quiz: the session, its countdown and the learner taking it.
///
/// Dropping an unfinished quiz aborts it and reports the partial tally.
pub struct ActiveQuiz {
    session: ExerciseSession,
    learner: Learner,
    timer: QuestionTimer,
    tick_tx: UnboundedSender<Tick>,
    ticks: UnboundedReceiver<Tick>,
    dispatcher: ReportDispatcher,
    clock: Clock,
}

impl ActiveQuiz {
    pub(crate) fn start(
        mut session: ExerciseSession,
        learner: Learner,
        timer: QuestionTimer,
        dispatcher: ReportDispatcher,
        clock: Clock,
    ) -> Result<Self, QuizError> {
        session.start()?;
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let mut quiz = Self {
            session,
            learner,
            timer,
            tick_tx,
            ticks,
            dispatcher,
            clock,
        };
        quiz.restart_timer();
        Ok(quiz)
    }

    #[must_use]
    pub fn session(&self) -> &ExerciseSession {
        &self.session
    }

    #[must_use]
    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    /// Countdown and tally, with every elapsed tick applied.
    pub fn progress(&mut self) -> SessionProgress {
        self.catch_up();
        self.session.progress()
    }

    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Record the learner's choice and stop the countdown.
    ///
    /// Ticks that elapsed since the last call are applied first: if the
    /// countdown already ran out, the choice is ignored and the timed-out
    /// outcome is returned instead.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when no question is on screen.
    pub fn answer(&mut self, selected: &str) -> Result<Option<AnswerOutcome>, QuizError> {
        if let Some(timed_out) = self.catch_up() {
            return Ok(Some(timed_out));
        }
        let outcome = self.session.answer(selected)?;
        if outcome.is_some() {
            self.timer.cancel();
        }
        Ok(outcome)
    }

    /// Wait for the next countdown tick of the presented question.
    ///
    /// Returns `None` when no question is being presented. Ticks left over
    /// from earlier questions are discarded.
    pub async fn next_tick(&mut self) -> Option<TickEvent> {
        loop {
            let index = match self.session.phase() {
                SessionPhase::Presenting { index } => index,
                _ => return None,
            };
            let tick = self.ticks.recv().await?;
            if tick.index == index {
                return Some(self.apply_tick(index));
            }
        }
    }

    /// Apply the ticks already queued for the presented question.
    ///
    /// Returns the timed-out outcome if they exhausted the countdown.
    pub(crate) fn catch_up(&mut self) -> Option<AnswerOutcome> {
        while let SessionPhase::Presenting { index } = self.session.phase() {
            let Ok(tick) = self.ticks.try_recv() else {
                return None;
            };
            if tick.index != index {
                continue;
            }
            if let TickEvent::TimedOut(outcome) = self.apply_tick(index) {
                return Some(outcome);
            }
        }
        None
    }

    fn apply_tick(&mut self, index: usize) -> TickEvent {
        match self.session.tick() {
            Some(outcome) => {
                self.timer.cancel();
                tracing::debug!(unit = %self.session.unit_id(), question = index, "question timed out");
                TickEvent::TimedOut(outcome)
            }
            None => TickEvent::Countdown {
                remaining_secs: self.session.state().remaining_secs,
            },
        }
    }

    /// Stop the attempt and report what was answered so far.
    ///
    /// Returns `None` if the quiz had already finished.
    pub fn abort(&mut self, reason: &str) -> Option<AbortedQuiz> {
        self.catch_up();
        self.timer.cancel();
        let result = self.session.abort()?;
        tracing::info!(
            unit = %result.unit_id,
            kind = %result.kind,
            answered = result.answered,
            total = result.total,
            reason,
            "quiz aborted"
        );
        let summary = ResultSummary::incomplete(&self.learner, &result, reason, self.clock.now());
        let report = self.dispatcher.dispatch(summary);
        Some(AbortedQuiz { result, report })
    }

    pub(crate) fn session_mut(&mut self) -> &mut ExerciseSession {
        &mut self.session
    }

    pub(crate) fn restart_timer(&mut self) {
        if let SessionPhase::Presenting { index } = self.session.phase() {
            self.timer.start(index, self.tick_tx.clone());
        } else {
            self.timer.cancel();
        }
    }
}

impl Drop for ActiveQuiz {
    fn drop(&mut self) {
        if !self.session.is_finished() {
            let _ = self.abort(DROPPED_REASON);
        }
    }
}
