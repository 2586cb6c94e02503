//! Unit content served from static JSON documents.
//!
//! Layout of the content root:
//!
//! ```text
//! units-index.json   { "availableUnits": [ { "id": 1, "title": "...", "status": "available",
//!                                            "file": "unit1.json", "grammarStructure": "...",
//!                                            "grammarExamples": ["..."] }, ... ] }
//! unit1.json         { "id": 1, "title": "...", "text": "...", "words": [ ... ] }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use els_core::model::{Unit, UnitId, UnitInfo};
use serde::Deserialize;

use crate::repository::{ContentRepository, StorageError};

pub const INDEX_FILE: &str = "units-index.json";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitsIndex {
    available_units: Vec<UnitInfo>,
}

/// Content store reading a directory of JSON documents.
///
/// The index and every loaded unit are cached for the life of the store. A
/// failed index load is not cached, so a later call retries it.
pub struct JsonContentStore {
    root: PathBuf,
    index: Mutex<Option<Vec<UnitInfo>>>,
    units: Mutex<HashMap<UnitId, Unit>>,
}

impl JsonContentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Mutex::new(None),
            units: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn index(&self) -> Result<Vec<UnitInfo>, StorageError> {
        {
            let guard = self
                .index
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            if let Some(index) = guard.as_ref() {
                return Ok(index.clone());
            }
        }

        let index: UnitsIndex = read_json(&self.root.join(INDEX_FILE)).await?;
        let mut guard = self
            .index
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(index.available_units.clone());
        Ok(index.available_units)
    }

    fn cached_unit(&self, id: UnitId) -> Result<Option<Unit>, StorageError> {
        let guard = self
            .units
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    async fn load_unit(&self, id: UnitId) -> Result<Unit, StorageError> {
        let index = self.index().await?;
        let info = index
            .iter()
            .find(|info| info.id == id)
            .ok_or(StorageError::NotFound)?;
        if !info.is_available() {
            return Err(StorageError::NotFound);
        }
        let file = info.file.as_deref().ok_or(StorageError::NotFound)?;

        let mut unit: Unit = read_json(&self.root.join(file)).await?;
        unit.merge_grammar_from(info);

        let mut guard = self
            .units
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(id, unit.clone());
        Ok(unit)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| StorageError::Serialization(format!("{}: {e}", path.display())))
}

#[async_trait]
impl ContentRepository for JsonContentStore {
    async fn list_units(&self) -> Result<Vec<UnitInfo>, StorageError> {
        match self.index().await {
            Ok(units) => Ok(units),
            Err(err) => {
                tracing::warn!(root = %self.root.display(), error = %err, "units index unavailable");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_unit(&self, id: UnitId) -> Result<Unit, StorageError> {
        if let Some(unit) = self.cached_unit(id)? {
            return Ok(unit);
        }
        self.load_unit(id).await.map_err(|err| {
            if !matches!(err, StorageError::NotFound) {
                tracing::warn!(unit = %id, error = %err, "unit could not be loaded");
            }
            StorageError::NotFound
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_root_lists_nothing() {
        let store = JsonContentStore::new("/definitely/not/here");
        assert!(store.list_units().await.unwrap().is_empty());
        assert!(matches!(
            store.fetch_unit(UnitId::new(1)).await,
            Err(StorageError::NotFound)
        ));
    }
}
