mod exercise;
mod flashcards;
mod ids;
mod learner;
mod progress;
mod question;
mod unit;

pub use ids::UnitId;

pub use exercise::{ExerciseKind, UnknownExerciseKind};
pub use flashcards::FlashcardDeck;
pub use learner::{Learner, LearnerError};
pub use progress::{
    ExerciseAttemptRecord, ExerciseStatus, PASS_THRESHOLD, ProgressError, UnitProgressSummary,
    percentage,
};
pub use question::Question;
pub use unit::{GrammarExample, Unit, UnitInfo, UnitStatus, Word};
