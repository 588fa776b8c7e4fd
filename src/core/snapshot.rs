//! Telemetry snapshot - last-known value per field key
//!
//! The server only sends the keys that changed, so every batch is merged into
//! a persistent map. A key keeps the value from the last batch that carried it.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: HashMap<String, Value>,
    /// When set, keys outside the subscription are dropped on merge
    accepted: Option<HashSet<String>>,
}

impl Snapshot {
    /// Snapshot accepting any key
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot restricted to the subscribed keys
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: HashMap::new(),
            accepted: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    /// Merge a batch of `(key, value)` pairs, last write wins.
    ///
    /// Returns the number of pairs applied.
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut applied = 0;
        for (key, value) in batch {
            if let Some(accepted) = &self.accepted {
                if !accepted.contains(&key) {
                    continue;
                }
            }
            self.values.insert(key, value);
            applied += 1;
        }
        applied
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget every value, keeping the key filter
    pub fn reset(&mut self) {
        self.values.clear();
    }
}
