//! State store — the shared key/value ledger threading values between nodes.
//!
//! Keys arrive two ways: external seeds at pipeline start, and node writes
//! via `set_output`. A node may overwrite a key that exists only as a seed
//! (Intake confirms `rules` and `max_emails`); a second node write to the
//! same key is a `DuplicateOutput` contract violation. The ledger preserves
//! insertion order and grows monotonically for the lifetime of one run.

use std::collections::HashSet;

use crate::error::NodeError;

/// Ordered write-once-per-key ledger.
#[derive(Debug, Default, Clone)]
pub struct StateStore {
    /// Insertion-ordered entries.
    entries: Vec<(String, String)>,
    /// Keys written by a node (as opposed to seeded externally).
    node_written: HashSet<String>,
}

impl StateStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with externally supplied seed values.
    pub fn seeded(seed: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut store = Self::new();
        for (key, value) in seed {
            store.seed(key, value);
        }
        store
    }

    /// Insert an external seed value. Seeds do not count as node writes.
    pub fn seed(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Record a node's `set_output` write.
    ///
    /// The first node write to a key lands even if the key was seeded; a
    /// second node write fails with `DuplicateOutput`.
    pub fn set_output(
        &mut self,
        node_id: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), NodeError> {
        let key = key.into();
        if self.node_written.contains(&key) {
            return Err(NodeError::DuplicateOutput {
                node_id: node_id.to_string(),
                key,
            });
        }
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.clone(), value));
        }
        self.node_written.insert(key);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
