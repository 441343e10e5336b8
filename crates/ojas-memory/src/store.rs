//! Durable key/value storage contract and its implementations.

use crate::error::MemoryError;
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Whole-value text storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the text stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError>;
    /// Replace the text stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError>;
    /// Delete `key`; removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), MemoryError>;
}

/// Process-local store, lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// File-backed store keeping one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileStore {
    /// Root directory for stored values.
    root: PathBuf,
    /// Serialize write access to value files.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store under the given root, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized file store (root={})", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the value file for a key.
    fn value_path(&self, key: &str) -> Result<PathBuf, MemoryError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Path to the temporary file used while replacing a value.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.tmp"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Replace a value atomically via a temporary file and rename.
    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        let path = self.value_path(key)?;
        let temp_path = self.temp_path(key);
        let _guard = self.write_lock.lock();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;
        debug!("stored value (key={}, len={})", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        let path = self.value_path(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed value (key={key})");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keys become file names, so only a conservative character set is accepted.
pub(crate) fn validate_key(key: &str) -> Result<(), MemoryError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(MemoryError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, InMemoryStore, KeyValueStore};
    use crate::MemoryError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn in_memory_store_get_set_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("a").expect("get"), None);
        store.set("a", "1").expect("set");
        store.set("a", "2").expect("overwrite");
        assert_eq!(store.get("a").expect("get"), Some("2".to_string()));
        assert_eq!(store.len(), 1);
        store.remove("a").expect("remove");
        store.remove("a").expect("remove missing");
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_round_trip() {
        let temp = tempdir().expect("tempdir");
        let store = FileStore::new(temp.path().join("data")).expect("store");

        assert_eq!(store.get("user_profile").expect("get"), None);
        store.set("user_profile", "{\"name\":\"a\"}").expect("set");
        assert_eq!(
            store.get("user_profile").expect("get"),
            Some("{\"name\":\"a\"}".to_string())
        );
        assert!(store.root().join("user_profile.json").exists());
        assert!(!store.root().join("user_profile.json.tmp").exists());

        store.remove("user_profile").expect("remove");
        assert_eq!(store.get("user_profile").expect("get after remove"), None);
        store.remove("user_profile").expect("remove missing");
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let temp = tempdir().expect("tempdir");
        let store = FileStore::new(temp.path()).expect("store");
        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(matches!(err, MemoryError::InvalidKey(_)), "key {key:?}");
        }
    }
}
