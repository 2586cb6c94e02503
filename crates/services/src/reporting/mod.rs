//! Delivery of attempt results to the external notification channel.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::{RelayConfig, TelegramConfig};
use crate::error::ReportError;

mod relay;
mod summary;
mod telegram;

pub use relay::HttpRelayReporter;
pub use summary::ResultSummary;
pub use telegram::TelegramReporter;

/// A destination for result summaries.
#[async_trait]
pub trait ResultReporter: Send + Sync {
    /// Deliver one summary.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the remote end is unreachable or refuses the summary.
    async fn report(&self, summary: &ResultSummary) -> Result<(), ReportError>;
}

/// Fire-and-forget front of a `ResultReporter`.
///
/// Delivery runs on a spawned task; failures are logged and never retried.
#[derive(Clone, Default)]
pub struct ReportDispatcher {
    reporter: Option<Arc<dyn ResultReporter>>,
}

impl ReportDispatcher {
    #[must_use]
    pub fn new(reporter: Arc<dyn ResultReporter>) -> Self {
        Self {
            reporter: Some(reporter),
        }
    }

    /// A dispatcher that drops every summary.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Pick a reporter from the environment: the HTTP relay when
    /// `ELS_RESULT_RELAY_URL` is set, else Telegram when its credentials are,
    /// else disabled.
    #[must_use]
    pub fn from_env() -> Self {
        if let Some(config) = RelayConfig::from_env() {
            tracing::info!(endpoint = %config.endpoint, "reporting results through relay");
            return Self::new(Arc::new(HttpRelayReporter::new(config)));
        }
        if let Some(config) = TelegramConfig::from_env() {
            tracing::info!(api = %config.api_base, "reporting results to telegram");
            return Self::new(Arc::new(TelegramReporter::new(config)));
        }
        tracing::info!("result reporting disabled");
        Self::disabled()
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.reporter.is_some()
    }

    /// Spawn delivery of `summary`.
    ///
    /// Returns the delivery task, or `None` when reporting is disabled or no
    /// tokio runtime is available. Callers never need to await it.
    pub fn dispatch(&self, summary: ResultSummary) -> Option<JoinHandle<()>> {
        let reporter = Arc::clone(self.reporter.as_ref()?);
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(unit = %summary.unit_id, error = %err, "result report dropped");
                return None;
            }
        };

        Some(handle.spawn(async move {
            match reporter.report(&summary).await {
                Ok(()) => tracing::debug!(
                    unit = %summary.unit_id,
                    exercise = %summary.exercise_type,
                    "result reported"
                ),
                Err(err) => tracing::warn!(
                    unit = %summary.unit_id,
                    exercise = %summary.exercise_type,
                    error = %err,
                    "result report failed"
                ),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use els_core::model::{ExerciseKind, Learner, UnitId};
    use els_core::time::fixed_now;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording(Mutex<Vec<ResultSummary>>);

    #[async_trait]
    impl ResultReporter for Recording {
        async fn report(&self, summary: &ResultSummary) -> Result<(), ReportError> {
            self.0.lock().unwrap().push(summary.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Failing(AtomicUsize);

    #[async_trait]
    impl ResultReporter for Failing {
        async fn report(&self, _summary: &ResultSummary) -> Result<(), ReportError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ReportError::Rejected("chat not found".into()))
        }
    }

    fn summary() -> ResultSummary {
        let learner = Learner::new("Aziza", "Karimova", "21-B").unwrap();
        ResultSummary::grammar_submission(&learner, UnitId::new(1), "x", fixed_now())
    }

    #[tokio::test]
    async fn dispatch_delivers_in_background() {
        let recording = Arc::new(Recording::default());
        let dispatcher = ReportDispatcher::new(recording.clone());

        let handle = dispatcher.dispatch(summary()).expect("spawned");
        handle.await.unwrap();

        let delivered = recording.0.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].exercise_type, ExerciseKind::Grammar.as_str());
    }

    #[tokio::test]
    async fn failures_are_swallowed_without_retry() {
        let failing = Arc::new(Failing::default());
        let dispatcher = ReportDispatcher::new(failing.clone());

        dispatcher.dispatch(summary()).expect("spawned").await.unwrap();
        assert_eq!(failing.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_dispatcher_does_nothing() {
        let dispatcher = ReportDispatcher::disabled();
        assert!(!dispatcher.enabled());
        assert!(dispatcher.dispatch(summary()).is_none());
    }

    #[test]
    fn dispatch_outside_a_runtime_is_dropped() {
        let dispatcher = ReportDispatcher::new(Arc::new(Recording::default()));
        assert!(dispatcher.dispatch(summary()).is_none());
    }
}
