use ojas_memory::{InMemoryStore, KeyValueStore, MemoryError};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Build an in-memory store pre-populated with raw entries.
pub fn seeded_store<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    for (key, value) in entries {
        store.set(key, value).expect("seed store");
    }
    Arc::new(store)
}

/// Store whose writes fail while `failing` is set; reads always succeed.
pub struct FailingStore {
    inner: InMemoryStore,
    failing: AtomicBool,
}

impl FailingStore {
    /// A store that rejects every write.
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn check(&self) -> Result<(), MemoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MemoryError::Io(io::Error::other("storage quota exceeded")));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// Operation observed by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set(String),
    Remove(String),
}

/// In-memory store that records every write.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    ops: Mutex<Vec<StoreOp>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes observed so far, oldest first.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
        self.ops.lock().push(StoreOp::Set(key.to_string()));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), MemoryError> {
        self.ops.lock().push(StoreOp::Remove(key.to_string()));
        self.inner.remove(key)
    }
}
