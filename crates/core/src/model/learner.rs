use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LearnerError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("surname cannot be empty")]
    EmptySurname,

    #[error("group cannot be empty")]
    EmptyGroup,
}

/// Identity a learner enters before studying; attached to every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    name: String,
    surname: String,
    group: String,
}

impl Learner {
    /// Build a learner from raw form input, trimming every field.
    ///
    /// # Errors
    ///
    /// Returns a `LearnerError` naming the first field that is blank.
    pub fn new(
        name: impl AsRef<str>,
        surname: impl AsRef<str>,
        group: impl AsRef<str>,
    ) -> Result<Self, LearnerError> {
        let name = name.as_ref().trim();
        let surname = surname.as_ref().trim();
        let group = group.as_ref().trim();

        if name.is_empty() {
            return Err(LearnerError::EmptyName);
        }
        if surname.is_empty() {
            return Err(LearnerError::EmptySurname);
        }
        if group.is_empty() {
            return Err(LearnerError::EmptyGroup);
        }

        Ok(Self {
            name: name.to_owned(),
            surname: surname.to_owned(),
            group: group.to_owned(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn surname(&self) -> &str {
        &self.surname
    }

    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_fields() {
        let learner = Learner::new("  Aziza ", "Karimova", " 21-B ").unwrap();
        assert_eq!(learner.name(), "Aziza");
        assert_eq!(learner.group(), "21-B");
        assert_eq!(learner.full_name(), "Aziza Karimova");
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(Learner::new(" ", "K", "G").unwrap_err(), LearnerError::EmptyName);
        assert_eq!(Learner::new("A", "", "G").unwrap_err(), LearnerError::EmptySurname);
        assert_eq!(Learner::new("A", "K", "\t").unwrap_err(), LearnerError::EmptyGroup);
    }
}
