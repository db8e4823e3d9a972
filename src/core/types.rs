//! Core data types for confmetrics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally assigned identifier of one evaluated example.
pub type RowId = u64;

/// Integer class index used in label tables and one-vs-all binarization.
pub type ClassIndex = i64;

/// One `(class_idx, label)` entry of a [`LabelTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Class index the label refers to
    pub class_idx: ClassIndex,
    /// Human-readable class name
    pub label: String,
}

/// Ordered mapping from class index to class name.
///
/// Iteration follows insertion order. Inserting an index that is already
/// present replaces its name in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    entries: Vec<LabelEntry>,
}

impl LabelTable {
    /// Create an empty label table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a label table from `(class_idx, label)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ClassIndex, S)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (class_idx, label) in pairs {
            table.insert(class_idx, label);
        }
        table
    }

    /// The `{0: "false", 1: "true"}` table used for binary problems
    pub fn binary() -> Self {
        Self::from_pairs([(0, "false"), (1, "true")])
    }

    /// Insert or rename a class
    pub fn insert<S: Into<String>>(&mut self, class_idx: ClassIndex, label: S) {
        let label = label.into();
        match self.entries.iter_mut().find(|e| e.class_idx == class_idx) {
            Some(entry) => entry.label = label,
            None => self.entries.push(LabelEntry { class_idx, label }),
        }
    }

    /// Name of the given class, if declared
    pub fn get(&self, class_idx: ClassIndex) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.class_idx == class_idx)
            .map(|e| e.label.as_str())
    }

    /// Number of declared classes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no class is declared
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(class_idx, label)` in table order
    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, &str)> + '_ {
        self.entries.iter().map(|e| (e.class_idx, e.label.as_str()))
    }

    /// Underlying entries in table order
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }
}

impl fmt::Display for LabelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (idx, label)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:?}", idx, label)?;
        }
        write!(f, "}}")
    }
}
