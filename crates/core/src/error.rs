use thiserror::Error;

use crate::generator::GeneratorError;
use crate::model::{LearnerError, ProgressError};
use crate::session::SessionError;

/// Any error raised by the domain layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Learner(#[from] LearnerError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExerciseKind, Learner, UnitId};
    use crate::session::ExerciseSession;
    use crate::time::fixed_now;

    fn start_empty_quiz() -> Result<ExerciseSession, Error> {
        Ok(ExerciseSession::new(
            UnitId::new(1),
            ExerciseKind::Definition,
            Vec::new(),
            fixed_now(),
        )?)
    }

    #[test]
    fn layer_errors_convert_and_keep_their_message() {
        assert_eq!(
            start_empty_quiz().unwrap_err(),
            Error::Session(SessionError::NoQuestions)
        );

        let err: Error = Learner::new("", "Karimova", "21-B").unwrap_err().into();
        assert_eq!(err.to_string(), "name cannot be empty");
    }
}
