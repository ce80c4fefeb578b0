//! Resolved configuration store.
//!
//! Populated once during pre-run by the resolver and read by every
//! downstream component afterwards. Keys are unique and a later `set`
//! overwrites an earlier one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// Key/value configuration resolved for one process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigStore {
    entries: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a value as a filesystem path.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
