pub mod api_keys;
pub mod file_store;
pub mod saved_ids;

use std::collections::HashMap;
use std::sync::Mutex;

pub use api_keys::{ApiKey, ApiKeyStore};
pub use file_store::FileStore;
pub use saved_ids::SavedPromptIds;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// String-keyed persistent storage with local-storage semantics: values are
/// opaque strings and a missing key reads as `None`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, used by tests and as a throwaway profile.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a JSON array stored under `key`. Anything unreadable comes back as
/// an empty list.
pub(crate) fn read_json_list<T>(store: &dyn KeyValueStore, key: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!(key, error = %e, "failed to read from storage");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable stored list");
            Vec::new()
        }
    }
}

/// Write a JSON array under `key`, logging instead of failing.
pub(crate) fn write_json_list<T>(store: &dyn KeyValueStore, key: &str, items: &[T])
where
    T: serde::Serialize,
{
    let result = serde_json::to_string(items)
        .map_err(StorageError::from)
        .and_then(|raw| store.set(key, &raw));
    if let Err(e) = result {
        tracing::error!(key, error = %e, "failed to write to storage");
    }
}
