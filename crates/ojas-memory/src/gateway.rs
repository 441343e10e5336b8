//! Typed snapshot reads and writes over a key/value store.

use crate::error::MemoryError;
use crate::store::KeyValueStore;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Serializes whole values to JSON text and reads them back leniently.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the value under `key`, falling back to `T::default()` when the
    /// entry is missing, unreadable, or fails to parse.
    pub fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        self.try_load(key).unwrap_or_default()
    }

    /// Load the value under `key`, returning `None` instead of the default.
    pub fn try_load<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let contents = match self.store.get(key) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("no stored value (key={key})");
                return None;
            }
            Err(err) => {
                warn!("failed to read stored value (key={key}): {err}");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding corrupt stored value (key={key}): {err}");
                None
            }
        }
    }

    /// Serialize `value` and write it under `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), MemoryError>
    where
        T: Serialize + ?Sized,
    {
        let contents = serde_json::to_string(value)?;
        self.store.set(key, &contents)
    }

    /// Delete the value under `key`.
    pub fn remove(&self, key: &str) -> Result<(), MemoryError> {
        self.store.remove(key)
    }
}
