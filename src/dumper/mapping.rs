//! # Result Mapping
//!
//! Ordered name → value collection with unique names.

use crate::config::DuplicatePolicy;
use crate::error::{DumpError, Result};
use std::collections::HashMap;

/// What happened to an inserted entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Name existed; value replaced in place
    Replaced,
    /// Name existed; new value dropped
    Ignored,
}

/// Insertion-ordered mapping from secret name to value
#[derive(Default)]
pub struct ResultMapping {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ResultMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry according to `policy`
    ///
    /// A replaced entry keeps the position of its first occurrence.
    ///
    /// # Errors
    /// `DuplicateSecretName` when the name exists and `policy` is `Error`.
    pub fn insert(
        &mut self,
        name: String,
        value: String,
        policy: DuplicatePolicy,
    ) -> Result<InsertOutcome> {
        let Some(&position) = self.index.get(&name) else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, value));
            return Ok(InsertOutcome::Inserted);
        };

        match policy {
            DuplicatePolicy::LastWins => {
                self.entries[position].1 = value;
                Ok(InsertOutcome::Replaced)
            }
            DuplicatePolicy::KeepFirst => Ok(InsertOutcome::Ignored),
            DuplicatePolicy::Error => Err(DumpError::DuplicateSecretName { name }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
