use std::sync::Arc;

use super::{KeyValueStore, read_json_list, write_json_list};

pub const SAVED_PROMPT_IDS_KEY: &str = "saved_prompt_ids";

/// Ordered set of prompt ids the user has kept ("My Prompts").
///
/// The hosted service has no notion of ownership; this list is the only
/// record of which prompts belong to the user. All operations fail soft.
#[derive(Clone)]
pub struct SavedPromptIds {
    store: Arc<dyn KeyValueStore>,
}

impl SavedPromptIds {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        read_json_list(self.store.as_ref(), SAVED_PROMPT_IDS_KEY)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|existing| existing == id)
    }

    pub fn add(&self, id: &str) {
        let mut ids = self.list();
        if ids.iter().any(|existing| existing == id) {
            return;
        }
        ids.push(id.to_string());
        write_json_list(self.store.as_ref(), SAVED_PROMPT_IDS_KEY, &ids);
        tracing::debug!(id, "saved prompt id");
    }

    pub fn remove(&self, id: &str) {
        let mut ids = self.list();
        ids.retain(|existing| existing != id);
        write_json_list(self.store.as_ref(), SAVED_PROMPT_IDS_KEY, &ids);
        tracing::debug!(id, "removed saved prompt id");
    }
}
