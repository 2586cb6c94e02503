use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown exercise kind: {0}")]
pub struct UnknownExerciseKind(pub String);

/// The five canonical quiz modes of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    /// Pick the definition of an English word.
    #[serde(rename = "definition")]
    Definition,
    /// Pick the Uzbek translation of an English word.
    #[serde(rename = "engToUz")]
    EngToUz,
    /// Pick the English word for an Uzbek translation.
    #[serde(rename = "uzToEng")]
    UzToEng,
    /// Pick the word missing from a sentence.
    #[serde(rename = "gapfill")]
    Gapfill,
    /// Questions built from the unit's grammar examples.
    #[serde(rename = "grammar")]
    Grammar,
}

impl ExerciseKind {
    /// All kinds in the order they are shown and aggregated.
    pub const ALL: [ExerciseKind; 5] = [
        ExerciseKind::Definition,
        ExerciseKind::EngToUz,
        ExerciseKind::UzToEng,
        ExerciseKind::Gapfill,
        ExerciseKind::Grammar,
    ];

    /// Stable label used in storage keys and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Definition => "definition",
            ExerciseKind::EngToUz => "engToUz",
            ExerciseKind::UzToEng => "uzToEng",
            ExerciseKind::Gapfill => "gapfill",
            ExerciseKind::Grammar => "grammar",
        }
    }

    /// Human-readable name. Presentation only, never parsed back.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::Definition => "Matching Definition",
            ExerciseKind::EngToUz => "English → Uzbek",
            ExerciseKind::UzToEng => "Uzbek → English",
            ExerciseKind::Gapfill => "Gap-Filling",
            ExerciseKind::Grammar => "Grammar Practice",
        }
    }

    /// True for the kinds generated from the vocabulary list.
    #[must_use]
    pub fn is_word_exercise(self) -> bool {
        !matches!(self, ExerciseKind::Grammar)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseKind {
    type Err = UnknownExerciseKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownExerciseKind(s.to_owned()))
    }
}
