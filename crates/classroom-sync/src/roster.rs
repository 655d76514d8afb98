//! Course rosters and the "who has not submitted" report.
//!
//! The roster file maps course names to student display names:
//!
//! ```yaml
//! Programmering 1:
//! - John Andersson
//! - David Johansson
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::feedback::Feedback;

/// Errors that can occur while loading a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("roster file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("I/O error reading roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("roster parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Canonical (NFC) form of a name, so a precomposed `å` and `a` + ring
/// compare equal.
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// Students per course. Every name is stored normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    courses: HashMap<String, BTreeSet<String>>,
}

impl Roster {
    pub fn from_yaml(yaml: &str) -> Result<Self, RosterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: HashMap<String, Option<Vec<String>>> = serde_yaml_ng::from_str(yaml)?;
        let mut roster = Self::default();
        for (course, students) in raw {
            roster.insert(&course, students.unwrap_or_default());
        }
        Ok(roster)
    }

    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RosterError::Missing(path.to_owned())
            } else {
                RosterError::Io(e)
            }
        })?;
        Self::from_yaml(&contents)
    }

    /// Load a roster, degrading to an empty one with a warning when the file
    /// is absent or unreadable.
    pub fn load_or_empty(path: &Path) -> (Self, Option<Feedback>) {
        match Self::load(path) {
            Ok(roster) => (roster, None),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "roster unavailable");
                let fb = Feedback::warning(format!(
                    "{e}; students missing submissions will not be reported"
                ));
                (Self::default(), Some(fb))
            }
        }
    }

    pub fn insert<I, S>(&mut self, course: &str, students: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.courses
            .entry(normalize_name(course))
            .or_default()
            .extend(students.into_iter().map(|s| normalize_name(s.as_ref())));
    }

    pub fn students(&self, course: &str) -> Option<&BTreeSet<String>> {
        self.courses.get(&normalize_name(course))
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Students on the course roster with nothing in `observed`.
    /// A course without a roster entry yields an empty set.
    pub fn missing_students<'a, I>(&self, course: &str, observed: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(enrolled) = self.students(course) else {
            return BTreeSet::new();
        };

        let observed: BTreeSet<String> = observed.into_iter().map(normalize_name).collect();
        enrolled.difference(&observed).cloned().collect()
    }
}
