use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{KeyValueStore, read_json_list, write_json_list};

pub const SAVED_API_KEYS_KEY: &str = "saved_api_keys";

const SECRET_SEGMENT_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A locally generated API key. Not issued by the hosted service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub key: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug)]
pub enum KeyCreateError {
    #[error("API key name is required")]
    BlankName,

    #[error("an API key named {0:?} already exists")]
    DuplicateName(String),

    #[error("failed to gather randomness: {0}")]
    Entropy(String),
}

/// Build a placeholder `sk_<base36>_<base36>` key record.
pub fn generate_api_key(name: &str) -> Result<ApiKey, KeyCreateError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KeyCreateError::BlankName);
    }

    Ok(ApiKey {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        key: format!("sk_{}_{}", random_base36()?, random_base36()?),
        created_at: Utc::now(),
    })
}

fn random_base36() -> Result<String, KeyCreateError> {
    let mut bytes = [0u8; SECRET_SEGMENT_LEN];
    getrandom::fill(&mut bytes).map_err(|e| KeyCreateError::Entropy(e.to_string()))?;
    Ok(bytes
        .iter()
        .map(|b| BASE36[*b as usize % BASE36.len()] as char)
        .collect())
}

/// Persisted list of generated API keys. Names are unique.
#[derive(Clone)]
pub struct ApiKeyStore {
    store: Arc<dyn KeyValueStore>,
}

impl ApiKeyStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<ApiKey> {
        read_json_list(self.store.as_ref(), SAVED_API_KEYS_KEY)
    }

    /// Append `key` unless one with the same name exists. Returns whether
    /// the record was stored.
    pub fn add(&self, key: ApiKey) -> bool {
        let mut keys = self.list();
        if keys.iter().any(|existing| existing.name == key.name) {
            tracing::warn!(name = %key.name, "API key with this name already exists");
            return false;
        }
        keys.push(key);
        write_json_list(self.store.as_ref(), SAVED_API_KEYS_KEY, &keys);
        true
    }

    pub fn remove(&self, id: &str) {
        let mut keys = self.list();
        keys.retain(|existing| existing.id != id);
        write_json_list(self.store.as_ref(), SAVED_API_KEYS_KEY, &keys);
    }

    /// Generate a placeholder key named `name` and store it.
    pub fn generate(&self, name: &str) -> Result<ApiKey, KeyCreateError> {
        let key = generate_api_key(name)?;
        if !self.add(key.clone()) {
            return Err(KeyCreateError::DuplicateName(key.name));
        }
        tracing::info!(id = %key.id, name = %key.name, "generated API key");
        Ok(key)
    }
}
