//! File-backed key-value store
//!
//! Keeps the whole map in one JSON document. Every mutation rewrites the
//! document through a temporary file and a rename, so a batch lands on disk
//! completely or not at all.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{KeyValueStore, StorageWrite};
use crate::error::{Result, SessionError};

pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open the store at `path`, creating parent directories as needed.
    /// A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                SessionError::Storage(format!("Corrupt store at {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        log::debug!("Opened key-value store at {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate(&self, writes: &[StorageWrite]) -> Result<()> {
        let mut entries = self.entries.lock()?;
        let mut next = entries.clone();

        for write in writes {
            match write {
                StorageWrite::Set(key, value) => {
                    next.insert(key.clone(), value.clone());
                }
                StorageWrite::Remove(key) => {
                    next.remove(key);
                }
            }
        }

        if next == *entries {
            return Ok(());
        }

        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(&[StorageWrite::set(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(&[StorageWrite::remove(key)])
    }

    fn apply(&self, writes: &[StorageWrite]) -> Result<()> {
        self.mutate(writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store
            .apply(&[StorageWrite::set("a", "1"), StorageWrite::set("b", "2")])
            .unwrap();
        store.remove("b").unwrap();
        drop(store);

        let reopened = FileKeyValueStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(reopened.get("b").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileKeyValueStore::open(&path),
            Err(SessionError::Storage(_))
        ));
    }

    #[test]
    fn test_removing_absent_key_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = FileKeyValueStore::open(&path).unwrap();
        store.remove("missing").unwrap();
        assert!(!path.exists());
    }
}
