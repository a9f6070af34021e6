//! Stable name indexing for state-space integration.
//!
//! Provides bidirectional mappings between state/input/output names and
//! contiguous matrix indices (0..N).

use std::collections::HashMap;

use crate::error::{NetworkError, NetworkResult};

/// Ordered list of names with O(1) reverse lookup.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    what: &'static str,
    names: Vec<String>,
    lookup: HashMap<String, usize>,
}

impl NameIndex {
    /// Build an index; `what` labels lookup errors ("state", "input", ...).
    pub fn new(what: &'static str, names: Vec<String>) -> Self {
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            what,
            names,
            lookup,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Index of `name`, or a lookup error.
    pub fn index(&self, name: &str) -> NetworkResult<usize> {
        self.get(name).ok_or_else(|| NetworkError::NameNotFound {
            what: self.what,
            name: name.to_string(),
        })
    }

    /// Indices for several names.
    pub fn indices<S: AsRef<str>>(&self, names: &[S]) -> NetworkResult<Vec<usize>> {
        names.iter().map(|n| self.index(n.as_ref())).collect()
    }

    /// Keep only names for which `keep` is true; returns the kept old indices.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) -> Vec<usize> {
        let kept: Vec<usize> = (0..self.names.len())
            .filter(|&i| keep(&self.names[i]))
            .collect();
        let names = kept.iter().map(|&i| self.names[i].clone()).collect();
        *self = Self::new(self.what, names);
        kept
    }
}
