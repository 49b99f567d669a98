//! Key-value persistence backends
//!
//! The reading store never touches the filesystem directly. It is handed a
//! [`KeyValueStore`] at construction and writes its whole snapshot into a
//! single key. Two backends are provided:
//!
//! - [`MemoryStore`]: HashMap-backed, for tests and throwaway sessions
//! - [`FileStore`]: one JSON file per key under a data directory, replaced
//!   atomically on every write

use crate::storage::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Durable single-key get/set capability
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

/// In-memory key-value store.
///
/// Clone-friendly via Arc: clones share the same map, so a test can keep a
/// handle and inspect what the reading store persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.into(), value.into());
        }
        store
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Lock("memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Lock("memory store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed key-value store
///
/// Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling and
/// are renamed over the target, so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = ?dir, "Opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::trace!(path = ?path, bytes = value.len(), "Wrote key");
        Ok(())
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.contains("..");

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("readings", "[]").unwrap();
        assert_eq!(handle.get("readings").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get("glucose-readings").unwrap(), None);

        store.set("glucose-readings", "[1,2,3]").unwrap();
        assert_eq!(
            store.get("glucose-readings").unwrap().as_deref(),
            Some("[1,2,3]")
        );

        // A second handle on the same directory sees the data
        let reopened = FileStore::open(dir.path().join("data")).unwrap();
        assert_eq!(
            reopened.get("glucose-readings").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn test_file_store_replaces_value() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("k", "a much longer first value").unwrap();
        store.set("k", "short").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));

        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden", "a..b", "sp ace"] {
            assert!(
                matches!(store.set(key, "x"), Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
