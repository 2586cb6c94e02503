use chrono::{DateTime, Utc};
use els_core::Clock;
use els_core::model::{Learner, LearnerError};
use storage::profile::{LearnerProfileStore, RememberedLearner};

/// A learner who passed the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnerEntry {
    pub learner: Learner,
    pub entered_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct LearnerService {
    clock: Clock,
    profile: LearnerProfileStore,
}

impl LearnerService {
    #[must_use]
    pub fn new(clock: Clock, profile: LearnerProfileStore) -> Self {
        Self { clock, profile }
    }

    /// Validate the entry form and remember name and surname for next time.
    ///
    /// Failing to remember the learner does not block entry.
    ///
    /// # Errors
    ///
    /// Returns `LearnerError` for a blank field.
    pub async fn enter(
        &self,
        name: &str,
        surname: &str,
        group: &str,
    ) -> Result<LearnerEntry, LearnerError> {
        let learner = Learner::new(name, surname, group)?;
        if let Err(err) = self.profile.remember(&learner).await {
            tracing::warn!(error = %err, "learner profile not saved");
        }
        tracing::info!(group = learner.group(), "learner entered");
        Ok(LearnerEntry {
            learner,
            entered_at: self.clock.now(),
        })
    }

    /// Name and surname to pre-fill the entry form with. Read failures yield nothing.
    pub async fn remembered(&self) -> RememberedLearner {
        self.profile.remembered().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "learner profile unavailable");
            RememberedLearner::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use els_core::time::{fixed_clock, fixed_now};
    use std::sync::Arc;
    use storage::repository::InMemoryRepository;

    fn service() -> LearnerService {
        let profile = LearnerProfileStore::new(Arc::new(InMemoryRepository::new()));
        LearnerService::new(fixed_clock(), profile)
    }

    #[tokio::test]
    async fn enter_trims_and_remembers() {
        let service = service();
        assert_eq!(service.remembered().await, RememberedLearner::default());

        let entry = service.enter("  Aziza ", "Karimova", " 21-B ").await.unwrap();
        assert_eq!(entry.learner.full_name(), "Aziza Karimova");
        assert_eq!(entry.learner.group(), "21-B");
        assert_eq!(entry.entered_at, fixed_now());

        let remembered = service.remembered().await;
        assert_eq!(remembered.name.as_deref(), Some("Aziza"));
        assert_eq!(remembered.surname.as_deref(), Some("Karimova"));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_and_not_remembered() {
        let service = service();
        assert_eq!(
            service.enter("Aziza", "   ", "21-B").await.unwrap_err(),
            LearnerError::EmptySurname
        );
        assert_eq!(service.remembered().await, RememberedLearner::default());
    }
}
