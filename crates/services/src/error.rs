//! Shared error types for the services crate.

use thiserror::Error;

use els_core::generator::GeneratorError;
use els_core::model::UnitId;
use els_core::session::SessionError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("unit {0} is not available")]
    ContentUnavailable(UnitId),
    #[error("unit {0} has no grammar practice")]
    GrammarUnavailable(UnitId),
    #[error("grammar example cannot be empty")]
    EmptySubmission,
    #[error("quizzes need a running tokio runtime")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Errors emitted by result reporters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("report request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("report was rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while reading reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported url scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
