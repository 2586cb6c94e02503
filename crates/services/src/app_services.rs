use std::path::PathBuf;
use std::sync::Arc;

use storage::profile::LearnerProfileStore;
use storage::progress::ProgressStore;
use storage::repository::Storage;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::learner_service::LearnerService;
use crate::progress_service::ProgressService;
use crate::quiz::QuizService;
use crate::reporting::ReportDispatcher;

/// Assembles the services the UI shell talks to.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    progress: Arc<ProgressService>,
    learner: Arc<LearnerService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, dispatcher: ReportDispatcher) -> Self {
        Self::with_config(storage, clock, dispatcher, QuizConfig::default())
    }

    #[must_use]
    pub fn with_config(
        storage: &Storage,
        clock: Clock,
        dispatcher: ReportDispatcher,
        config: QuizConfig,
    ) -> Self {
        let quiz = Arc::new(QuizService::new(clock, storage, dispatcher).with_config(config));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.content),
            ProgressStore::new(Arc::clone(&storage.kv), clock),
        ));
        let learner = Arc::new(LearnerService::new(
            clock,
            LearnerProfileStore::new(Arc::clone(&storage.kv)),
        ));
        Self {
            quiz,
            progress,
            learner,
        }
    }

    /// Build services backed by `SQLite` progress and JSON unit content,
    /// reporting wherever the environment points.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        content_root: impl Into<PathBuf>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url, content_root, clock).await?;
        Ok(Self::new(&storage, clock, ReportDispatcher::from_env()))
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn learner(&self) -> Arc<LearnerService> {
        Arc::clone(&self.learner)
    }
}
