#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod learner_service;
pub mod progress_service;
pub mod quiz;
pub mod reporting;
pub mod telemetry;
pub mod timer;

pub use els_core::Clock;

pub use app_services::AppServices;
pub use config::{QuizConfig, RelayConfig, TelegramConfig};
pub use error::{AppServicesError, ConfigError, QuizError, ReportError};
pub use learner_service::{LearnerEntry, LearnerService};
pub use progress_service::{ExerciseProgress, ProgressService, UnitOverview};
pub use quiz::{ActiveQuiz, QuizOutcome, QuizService, QuizStep, TickEvent};
pub use reporting::{
    HttpRelayReporter, ReportDispatcher, ResultReporter, ResultSummary, TelegramReporter,
};
pub use telemetry::init_tracing;
