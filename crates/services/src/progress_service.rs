use std::sync::Arc;

use els_core::model::{
    ExerciseKind, ExerciseStatus, UnitId, UnitInfo, UnitProgressSummary,
};
use serde::Serialize;
use storage::progress::ProgressStore;
use storage::repository::{ContentRepository, StorageError};

/// One tile of a unit's exercise board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
    pub kind: ExerciseKind,
    pub display_name: &'static str,
    pub score: u8,
    pub completed: bool,
    pub status: ExerciseStatus,
}

/// A unit on the dashboard with its aggregate progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitOverview {
    pub unit: UnitInfo,
    pub summary: UnitProgressSummary,
}

/// Read-only views over stored progress and the unit index.
#[derive(Clone)]
pub struct ProgressService {
    content: Arc<dyn ContentRepository>,
    progress: ProgressStore,
}

impl ProgressService {
    #[must_use]
    pub fn new(content: Arc<dyn ContentRepository>, progress: ProgressStore) -> Self {
        Self { content, progress }
    }

    /// Every canonical exercise of a unit, in canonical order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if progress cannot be read.
    pub async fn exercise_board(
        &self,
        unit_id: UnitId,
    ) -> Result<Vec<ExerciseProgress>, StorageError> {
        Ok(self
            .progress
            .records(unit_id)
            .await?
            .into_iter()
            .map(|(kind, record)| ExerciseProgress {
                kind,
                display_name: kind.display_name(),
                score: record.score,
                completed: record.completed,
                status: record.status(),
            })
            .collect())
    }

    /// Every indexed unit with its progress summary.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the index or progress cannot be read.
    pub async fn dashboard(&self) -> Result<Vec<UnitOverview>, StorageError> {
        let units = self.content.list_units().await?;
        let mut overview = Vec::with_capacity(units.len());
        for unit in units {
            let summary = self.progress.summarize(unit.id).await?;
            overview.push(UnitOverview { unit, summary });
        }
        Ok(overview)
    }

    /// Units whose title contains `query`, ignoring case. A blank query matches everything.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the index cannot be read.
    pub async fn search_units(&self, query: &str) -> Result<Vec<UnitInfo>, StorageError> {
        let query = query.trim().to_lowercase();
        let units = self.content.list_units().await?;
        Ok(units
            .into_iter()
            .filter(|unit| query.is_empty() || unit.title.to_lowercase().contains(&query))
            .collect())
    }
}
