use serde::{Deserialize, Serialize};

use crate::model::ExerciseKind;

/// A multiple-choice question produced by the generator.
///
/// `options` never contains duplicates and exactly one option equals
/// `correct`; the position of the correct option carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct: String,
    pub kind: ExerciseKind,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct
    }

    /// Position of the correct option as presented.
    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct)
    }

    /// Option labels as shown to the learner: `A. ...`, `B. ...`.
    #[must_use]
    pub fn lettered_options(&self) -> Vec<String> {
        ('A'..='Z')
            .zip(&self.options)
            .map(|(letter, option)| format!("{letter}. {option}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_correct_option_and_letters() {
        let question = Question {
            text: "Translate \"key\" to Uzbek:".into(),
            options: vec!["eshik".into(), "kalit".into()],
            correct: "kalit".into(),
            kind: ExerciseKind::EngToUz,
        };
        assert_eq!(question.correct_index(), Some(1));
        assert!(question.is_correct("kalit"));
        assert!(!question.is_correct("eshik"));
        assert_eq!(question.lettered_options(), vec!["A. eshik", "B. kalit"]);
    }
}
