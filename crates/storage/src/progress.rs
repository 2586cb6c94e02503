use std::sync::Arc;

use els_core::Clock;
use els_core::model::{ExerciseAttemptRecord, ExerciseKind, UnitId, UnitProgressSummary};

use crate::repository::{KeyValueStore, StorageError};

/// Storage key of the latest attempt for (unit, kind).
#[must_use]
pub fn progress_key(unit_id: UnitId, kind: ExerciseKind) -> String {
    format!("unit_{unit_id}_exercise_{kind}")
}

/// Per-(unit, exercise kind) record of the latest attempt.
///
/// Writes replace the previous record; history is not kept.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { kv, clock }
    }

    /// Latest attempt, or the zero-record if the exercise was never attempted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored value is malformed.
    pub async fn get(
        &self,
        unit_id: UnitId,
        kind: ExerciseKind,
    ) -> Result<ExerciseAttemptRecord, StorageError> {
        match self.kv.get(&progress_key(unit_id, kind)).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(ExerciseAttemptRecord::empty()),
        }
    }

    /// Overwrite the record with a new attempt stamped with the store's clock.
    ///
    /// `completed` forces completion; otherwise it follows the pass threshold.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Invalid` for scores above 100, or a backend error.
    pub async fn set(
        &self,
        unit_id: UnitId,
        kind: ExerciseKind,
        score: u8,
        completed: bool,
    ) -> Result<ExerciseAttemptRecord, StorageError> {
        let record = ExerciseAttemptRecord::new(unit_id, kind, score, completed, self.clock.now())?;
        let raw =
            serde_json::to_string(&record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.set(&progress_key(unit_id, kind), &raw).await?;
        tracing::debug!(unit = %unit_id, kind = %kind, score, completed = record.completed, "progress saved");
        Ok(record)
    }

    /// Records of every canonical kind, in canonical order.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError` encountered.
    pub async fn records(
        &self,
        unit_id: UnitId,
    ) -> Result<Vec<(ExerciseKind, ExerciseAttemptRecord)>, StorageError> {
        let mut records = Vec::with_capacity(ExerciseKind::ALL.len());
        for kind in ExerciseKind::ALL {
            records.push((kind, self.get(unit_id, kind).await?));
        }
        Ok(records)
    }

    /// Aggregate progress of a unit.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError` encountered.
    pub async fn summarize(&self, unit_id: UnitId) -> Result<UnitProgressSummary, StorageError> {
        let records: Vec<_> = self
            .records(unit_id)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        Ok(UnitProgressSummary::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use chrono::Duration;
    use els_core::time::{fixed_clock, fixed_now};

    fn store(repo: &InMemoryRepository) -> ProgressStore {
        ProgressStore::new(Arc::new(repo.clone()), fixed_clock())
    }

    #[test]
    fn key_matches_local_storage_layout() {
        assert_eq!(
            progress_key(UnitId::new(3), ExerciseKind::EngToUz),
            "unit_3_exercise_engToUz"
        );
    }

    #[tokio::test]
    async fn missing_record_is_zero() {
        let repo = InMemoryRepository::new();
        let record = store(&repo)
            .get(UnitId::new(1), ExerciseKind::Gapfill)
            .await
            .unwrap();
        assert_eq!(record, ExerciseAttemptRecord::empty());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let repo = InMemoryRepository::new();
        let mut progress = store(&repo);
        let unit = UnitId::new(1);

        let first = progress.set(unit, ExerciseKind::Definition, 90, false).await.unwrap();
        assert!(first.completed);
        assert_eq!(first.completed_at, Some(fixed_now()));

        progress.clock.advance(Duration::minutes(5));
        let second = progress.set(unit, ExerciseKind::Definition, 40, false).await.unwrap();
        assert!(!second.completed);

        let stored = progress.get(unit, ExerciseKind::Definition).await.unwrap();
        assert_eq!(stored.score, 40);
        assert!(!stored.completed);
        assert_eq!(stored.completed_at, Some(fixed_now() + Duration::minutes(5)));
    }

    #[tokio::test]
    async fn explicit_completion_sticks_for_that_write() {
        let repo = InMemoryRepository::new();
        let record = store(&repo)
            .set(UnitId::new(1), ExerciseKind::Grammar, 100, true)
            .await
            .unwrap();
        assert!(record.completed);
        assert_eq!(record.exercise_kind, Some(ExerciseKind::Grammar));
    }

    #[tokio::test]
    async fn invalid_score_is_not_written() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        let err = progress
            .set(UnitId::new(1), ExerciseKind::UzToEng, 150, false)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
        assert_eq!(repo.get("unit_1_exercise_uzToEng").await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_value_is_a_serialization_error() {
        let repo = InMemoryRepository::new();
        repo.set("unit_1_exercise_definition", "{not json").await.unwrap();
        let err = store(&repo)
            .get(UnitId::new(1), ExerciseKind::Definition)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn reads_records_written_by_other_clients() {
        let repo = InMemoryRepository::new();
        repo.set(
            "unit_2_exercise_gapfill",
            r#"{"score":80,"completed":true,"date":"2024-03-01T10:00:00.000Z","unitId":2,"exerciseType":"gapfill"}"#,
        )
        .await
        .unwrap();
        let record = store(&repo)
            .get(UnitId::new(2), ExerciseKind::Gapfill)
            .await
            .unwrap();
        assert_eq!(record.score, 80);
        assert!(record.completed);
        assert!(record.is_attempted());
    }

    #[tokio::test]
    async fn summarize_covers_all_kinds() {
        let repo = InMemoryRepository::new();
        let progress = store(&repo);
        let unit = UnitId::new(1);
        progress.set(unit, ExerciseKind::Definition, 100, false).await.unwrap();
        progress.set(unit, ExerciseKind::EngToUz, 50, false).await.unwrap();

        let records = progress.records(unit).await.unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].0, ExerciseKind::Definition);

        let summary = progress.summarize(unit).await.unwrap();
        assert_eq!(summary.average_score, 75);
        assert_eq!(summary.completed_count, 1);
        assert_eq!(summary.completion_rate, 20);
    }
}
