//! Ordered name -> table mapping for compendia

use super::{ClinicalTable, ExpressionTable};

/// Insertion-ordered mapping from compendium name to one table
///
/// Names are unique. Inserting an existing name replaces its table and keeps
/// the original position.
#[derive(Debug, Clone, PartialEq)]
pub struct CompendiumMap<T> {
    entries: Vec<(String, T)>,
}

/// Expression tables keyed by compendium
pub type CompendiumExpressionMap = CompendiumMap<ExpressionTable>;

/// Clinical tables keyed by compendium
pub type CompendiumClinicalMap = CompendiumMap<ClinicalTable>;

impl<T> CompendiumMap<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert a table, returning the previous table stored under `name`
    pub fn insert(&mut self, name: impl Into<String>, table: T) -> Option<T> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, table)),
            None => {
                self.entries.push((name, table));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate (name, table) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}

impl<T> Default for CompendiumMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: Into<String>> FromIterator<(S, T)> for CompendiumMap<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, table) in iter {
            map.insert(name, table);
        }
        map
    }
}
