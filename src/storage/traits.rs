//! Abstract interface for the persistent key-value store
//!
//! Identities are mirrored here as durable shadow copies. The store is
//! string-keyed and string-valued, scoped to one client installation.

use crate::error::Result;

/// A single mutation inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageWrite {
    Set(String, String),
    Remove(String),
}

impl StorageWrite {
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        StorageWrite::Set(key.to_string(), value.into())
    }

    pub fn remove(key: &str) -> Self {
        StorageWrite::Remove(key.to_string())
    }

    pub fn key(&self) -> &str {
        match self {
            StorageWrite::Set(key, _) | StorageWrite::Remove(key) => key,
        }
    }
}

/// Durable string storage keyed by name
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never set or was removed
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Apply every write or none of them.
    ///
    /// The default applies writes one by one and restores the previous values
    /// if any write fails. Backends with a native transaction should override it.
    fn apply(&self, writes: &[StorageWrite]) -> Result<()> {
        let mut previous: Vec<(&str, Option<String>)> = Vec::with_capacity(writes.len());

        for write in writes {
            let before = self.get(write.key())?;
            let outcome = match write {
                StorageWrite::Set(key, value) => self.set(key, value),
                StorageWrite::Remove(key) => self.remove(key),
            };

            if let Err(e) = outcome {
                for (key, value) in previous.into_iter().rev() {
                    let restored = match value {
                        Some(value) => self.set(key, &value),
                        None => self.remove(key),
                    };
                    if let Err(restore_err) = restored {
                        log::warn!("Failed to restore '{}' after aborted batch: {}", key, restore_err);
                    }
                }
                return Err(e);
            }

            previous.push((write.key(), before));
        }

        Ok(())
    }
}
