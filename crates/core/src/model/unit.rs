use serde::{Deserialize, Serialize};

use crate::model::ids::UnitId;

//
// ─── VOCABULARY ────────────────────────────────────────────────────────────────
//

/// A vocabulary entry of a unit.
///
/// `word` is the identity of the entry within its unit; distractor selection
/// relies on it being unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub definition: String,
    pub translation: String,
}

impl Word {
    #[must_use]
    pub fn new(
        word: impl Into<String>,
        definition: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
            translation: translation.into(),
        }
    }
}

/// A sentence illustrating a unit's grammar structure.
pub type GrammarExample = String;

//
// ─── UNITS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Available,
    /// Anything the index does not mark as available ("locked", "coming-soon", ...).
    #[serde(other)]
    Locked,
}

/// Index entry describing a unit before its content is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitInfo {
    pub id: UnitId,
    pub title: String,
    pub status: UnitStatus,
    /// Document holding the unit content, relative to the content root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grammar_examples: Vec<GrammarExample>,
}

impl UnitInfo {
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == UnitStatus::Available
    }
}

/// A fully loaded lesson unit: reading text, vocabulary and optional grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grammar_examples: Vec<GrammarExample>,
}

impl Unit {
    /// The grammar structure label, if the unit teaches one.
    #[must_use]
    pub fn grammar(&self) -> Option<&str> {
        self.grammar_structure
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Copies grammar content from the index entry, which is authoritative for it.
    pub fn merge_grammar_from(&mut self, info: &UnitInfo) {
        if info.grammar_structure.is_some() {
            self.grammar_structure.clone_from(&info.grammar_structure);
            self.grammar_examples.clone_from(&info.grammar_examples);
        }
    }
}
