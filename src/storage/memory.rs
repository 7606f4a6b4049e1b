//! In-memory key-value store for development and testing
//!
//! Nothing survives the process. A store can be cloned to simulate a reload:
//! clones share the same map, so a second `SessionContext` built on a clone
//! sees what the first one persisted.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::traits::KeyValueStore;
use crate::error::{Result, SessionError};

#[derive(Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    rejected_keys: Arc<Mutex<HashSet<String>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `set` on `key` fail, as a full or locked browser store would
    pub fn reject_writes_to(&self, key: &str) {
        if let Ok(mut rejected) = self.rejected_keys.lock() {
            rejected.insert(key.to_string());
        }
    }

    /// Get the number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.rejected_keys.lock()?.contains(key) {
            return Err(SessionError::Storage(format!("write to '{}' rejected", key)));
        }
        self.entries.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageWrite;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryKeyValueStore::new();
        let reloaded = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(reloaded.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_failed_batch_is_rolled_back() {
        let store = MemoryKeyValueStore::new();
        store.set("a", "old").unwrap();
        store.reject_writes_to("b");

        let result = store.apply(&[StorageWrite::set("a", "new"), StorageWrite::set("b", "x")]);

        assert!(result.is_err());
        assert_eq!(store.get("a").unwrap(), Some("old".to_string()));
        assert!(!store.contains_key("b"));
    }

    #[test]
    fn test_rollback_removes_keys_that_did_not_exist() {
        let store = MemoryKeyValueStore::new();
        store.reject_writes_to("b");

        let result = store.apply(&[StorageWrite::set("a", "new"), StorageWrite::set("b", "x")]);

        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
