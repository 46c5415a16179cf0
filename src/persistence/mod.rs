//! Flat key-value persistence
//!
//! Progression and settings are stored as individual string values under
//! flat keys (LocalStorage on web, in-memory elsewhere). Writes are
//! best-effort: callers log failures and carry on.

use std::collections::HashMap;

use thiserror::Error;

/// Storage write failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// No backing storage is reachable (e.g. private browsing)
    #[error("storage unavailable")]
    Unavailable,
    /// The backend refused the write (quota, permissions)
    #[error("write of key `{key}` rejected: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// String-keyed, string-valued storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Write a value, logging instead of propagating failures
pub fn write_best_effort(store: &mut impl KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        log::warn!("Failed to persist `{}`: {}", key, e);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("currency"), None);
        store.set("currency", "12.5").unwrap();
        assert_eq!(store.get("currency").as_deref(), Some("12.5"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_best_effort_write_swallows_errors() {
        let mut store = testing::ReadOnlyStore::default();
        write_best_effort(&mut store, "currency", "1");
        assert_eq!(store.get("currency"), None);
    }
}
