use std::sync::Arc;

use els_core::Clock;
use els_core::generator::{generate, generate_grammar};
use els_core::model::{ExerciseAttemptRecord, ExerciseKind, Learner, Question, Unit, UnitId};
use els_core::session::{Advance, AnswerOutcome, ExerciseSession, SessionResult};
use rand::Rng;
use storage::repository::{ContentRepository, Storage, StorageError};
use storage::progress::ProgressStore;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::reporting::{ReportDispatcher, ResultSummary};
use crate::timer::QuestionTimer;

use super::active::{AbortedQuiz, ActiveQuiz};

/// Result of continuing past an answered question.
#[derive(Debug)]
pub enum QuizStep {
    Next { index: usize, question: Question },
    Completed(QuizOutcome),
}

/// A finished attempt.
#[derive(Debug)]
pub struct QuizOutcome {
    pub result: SessionResult,
    /// The stored progress record; `None` when the write failed.
    pub record: Option<ExerciseAttemptRecord>,
    pub report: Option<JoinHandle<()>>,
}

/// A stored free-text grammar example.
#[derive(Debug)]
pub struct GrammarSubmission {
    pub record: Option<ExerciseAttemptRecord>,
    pub report: Option<JoinHandle<()>>,
}

/// Orchestrates quiz start, answering, completion and reporting.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    content: Arc<dyn ContentRepository>,
    progress: ProgressStore,
    dispatcher: ReportDispatcher,
    config: QuizConfig,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage, dispatcher: ReportDispatcher) -> Self {
        Self {
            clock,
            content: Arc::clone(&storage.content),
            progress: ProgressStore::new(Arc::clone(&storage.kv), clock),
            dispatcher,
            config: QuizConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: QuizConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> QuizConfig {
        self.config
    }

    /// Load a unit and start a freshly generated quiz on it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ContentUnavailable` for missing or locked units,
    /// `QuizError::GrammarUnavailable` for grammar on a unit without a
    /// grammar structure, and `QuizError::Session` when nothing could be
    /// generated.
    pub async fn start_exercise(
        &self,
        learner: &Learner,
        unit_id: UnitId,
        kind: ExerciseKind,
    ) -> Result<ActiveQuiz, QuizError> {
        let unit = self.load_unit(unit_id).await?;
        self.build_quiz(learner, &unit, kind, &mut rand::rng())
    }

    /// Same as [`Self::start_exercise`] with a caller-provided random source.
    ///
    /// # Errors
    ///
    /// See [`Self::start_exercise`].
    pub async fn start_exercise_with_rng<R: Rng + Send>(
        &self,
        learner: &Learner,
        unit_id: UnitId,
        kind: ExerciseKind,
        rng: &mut R,
    ) -> Result<ActiveQuiz, QuizError> {
        let unit = self.load_unit(unit_id).await?;
        self.build_quiz(learner, &unit, kind, rng)
    }

    /// Answer the presented question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` when no question is on screen.
    pub fn answer(
        &self,
        quiz: &mut ActiveQuiz,
        selected: &str,
    ) -> Result<Option<AnswerOutcome>, QuizError> {
        quiz.answer(selected)
    }

    /// Move past the answered question. After the last one the attempt is
    /// stored and reported.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` while the question is still open or once
    /// the quiz has ended.
    pub async fn continue_quiz(&self, quiz: &mut ActiveQuiz) -> Result<QuizStep, QuizError> {
        quiz.catch_up();
        match quiz.session_mut().advance()? {
            Advance::Next { index } => {
                quiz.restart_timer();
                let question = quiz.session().questions()[index].clone();
                Ok(QuizStep::Next { index, question })
            }
            Advance::Completed(result) => {
                quiz.restart_timer();
                let record = self
                    .save_progress(result.unit_id, result.kind, result.percentage, false)
                    .await;
                tracing::info!(
                    unit = %result.unit_id,
                    kind = %result.kind,
                    correct = result.correct,
                    total = result.total,
                    percentage = result.percentage,
                    "quiz completed"
                );
                let summary = ResultSummary::completed(quiz.learner(), &result, self.clock.now());
                let report = self.dispatcher.dispatch(summary);
                Ok(QuizStep::Completed(QuizOutcome {
                    result,
                    record,
                    report,
                }))
            }
        }
    }

    /// Abandon the quiz and report the partial tally. The progress record is left untouched.
    pub fn abort(&self, quiz: &mut ActiveQuiz, reason: &str) -> Option<AbortedQuiz> {
        quiz.abort(reason)
    }

    /// Accept a learner-written grammar example, which always completes the
    /// unit's grammar exercise with full marks.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptySubmission` for blank text.
    pub async fn submit_grammar_text(
        &self,
        learner: &Learner,
        unit_id: UnitId,
        text: &str,
    ) -> Result<GrammarSubmission, QuizError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QuizError::EmptySubmission);
        }

        let record = self
            .save_progress(unit_id, ExerciseKind::Grammar, 100, true)
            .await;
        tracing::info!(unit = %unit_id, "grammar example submitted");
        let summary = ResultSummary::grammar_submission(learner, unit_id, text, self.clock.now());
        let report = self.dispatcher.dispatch(summary);
        Ok(GrammarSubmission { record, report })
    }

    async fn load_unit(&self, unit_id: UnitId) -> Result<Unit, QuizError> {
        match self.content.fetch_unit(unit_id).await {
            Ok(unit) => Ok(unit),
            Err(StorageError::NotFound) => Err(QuizError::ContentUnavailable(unit_id)),
            Err(err) => {
                tracing::warn!(unit = %unit_id, error = %err, "unit could not be loaded");
                Err(QuizError::ContentUnavailable(unit_id))
            }
        }
    }

    fn build_quiz<R: Rng>(
        &self,
        learner: &Learner,
        unit: &Unit,
        kind: ExerciseKind,
        rng: &mut R,
    ) -> Result<ActiveQuiz, QuizError> {
        let questions = if kind.is_word_exercise() {
            generate(&unit.words, kind, self.config.max_word_questions, rng)?
        } else {
            let structure = unit.grammar().ok_or(QuizError::GrammarUnavailable(unit.id))?;
            generate_grammar(
                structure,
                &unit.grammar_examples,
                self.config.grammar_questions,
                rng,
            )
        };

        let session = ExerciseSession::new(unit.id, kind, questions, self.clock.now())?
            .with_time_budget(self.config.question_seconds)?;
        let timer = QuestionTimer::new(Handle::try_current()?);
        let quiz = ActiveQuiz::start(
            session,
            learner.clone(),
            timer,
            self.dispatcher.clone(),
            self.clock,
        )?;
        tracing::info!(
            unit = %unit.id,
            kind = %kind,
            questions = quiz.session().total(),
            "quiz started"
        );
        Ok(quiz)
    }

    async fn save_progress(
        &self,
        unit_id: UnitId,
        kind: ExerciseKind,
        score: u8,
        completed: bool,
    ) -> Option<ExerciseAttemptRecord> {
        match self.progress.set(unit_id, kind, score, completed).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(unit = %unit_id, kind = %kind, error = %err, "progress not saved");
                None
            }
        }
    }
}
