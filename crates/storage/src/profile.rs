use std::sync::Arc;

use els_core::model::Learner;

use crate::repository::{KeyValueStore, StorageError};

pub const NAME_KEY: &str = "elsName";
pub const SURNAME_KEY: &str = "elsSurname";

/// Name and surname pre-filled on the next visit. The group is never remembered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RememberedLearner {
    pub name: Option<String>,
    pub surname: Option<String>,
}

#[derive(Clone)]
pub struct LearnerProfileStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LearnerProfileStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if either value cannot be written.
    pub async fn remember(&self, learner: &Learner) -> Result<(), StorageError> {
        self.kv.set(NAME_KEY, learner.name()).await?;
        self.kv.set(SURNAME_KEY, learner.surname()).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn remembered(&self) -> Result<RememberedLearner, StorageError> {
        Ok(RememberedLearner {
            name: self.kv.get(NAME_KEY).await?,
            surname: self.kv.get(SURNAME_KEY).await?,
        })
    }
}
