#![forbid(unsafe_code)]

pub mod content;
pub mod profile;
pub mod progress;
pub mod repository;
pub mod sqlite;

pub use progress::ProgressStore;
pub use profile::LearnerProfileStore;
pub use repository::{ContentRepository, KeyValueStore, Storage, StorageError};
