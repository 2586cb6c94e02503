use async_trait::async_trait;
use els_core::model::{ProgressError, Unit, UnitId, UnitInfo, UnitStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Invalid(#[from] ProgressError),
}

/// Durable string-to-string mapping backing progress and the learner profile.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value; deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read-only access to lesson units.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List every unit of the index, available or not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the index cannot be produced.
    async fn list_units(&self) -> Result<Vec<UnitInfo>, StorageError>;

    /// Load a unit's content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the unit is unknown, locked, or unreadable.
    async fn fetch_unit(&self, id: UnitId) -> Result<Unit, StorageError>;
}

/// Simple in-memory repository implementation for testing and embedding.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
    units: Arc<Mutex<Vec<(UnitInfo, Option<Unit>)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index entry and, for available units, its content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the unit list lock is poisoned.
    pub fn add_unit(&self, info: UnitInfo, unit: Option<Unit>) -> Result<(), StorageError> {
        let mut guard = self
            .units
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.retain(|(existing, _)| existing.id != info.id);
        guard.push((info, unit));
        Ok(())
    }

    /// Register a unit as available, deriving its index entry from the content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the unit list lock is poisoned.
    pub fn add_available_unit(&self, unit: Unit) -> Result<(), StorageError> {
        let info = UnitInfo {
            id: unit.id,
            title: unit.title.clone(),
            status: UnitStatus::Available,
            file: None,
            grammar_structure: unit.grammar_structure.clone(),
            grammar_examples: unit.grammar_examples.clone(),
        };
        self.add_unit(info, Some(unit))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn list_units(&self) -> Result<Vec<UnitInfo>, StorageError> {
        let guard = self
            .units
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().map(|(info, _)| info.clone()).collect())
    }

    async fn fetch_unit(&self, id: UnitId) -> Result<Unit, StorageError> {
        let guard = self
            .units
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let (info, unit) = guard
            .iter()
            .find(|(info, _)| info.id == id)
            .ok_or(StorageError::NotFound)?;
        if !info.is_available() {
            return Err(StorageError::NotFound);
        }
        let mut unit = unit.clone().ok_or(StorageError::NotFound)?;
        unit.merge_grammar_from(info);
        Ok(unit)
    }
}

/// Aggregates the key-value and content backends behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
    pub content: Arc<dyn ContentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    /// Share one in-memory repository as both backends, so tests can seed units on it.
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let kv: Arc<dyn KeyValueStore> = Arc::new(repo.clone());
        let content: Arc<dyn ContentRepository> = Arc::new(repo);
        Self { kv, content }
    }
}
