//! Timed quiz orchestration on top of the core session state machine.

mod active;
mod service;

pub use active::{AbortedQuiz, ActiveQuiz, DROPPED_REASON, TickEvent};
pub use service::{GrammarSubmission, QuizOutcome, QuizService, QuizStep};
