//! Key-value settings store
//!
//! A flat map of named options living in the study document. Writes
//! merge key-by-key, so options written by a newer build survive a
//! round trip through an older one; the whole record is only dropped by
//! a full document reset.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::storage::{DocumentStore, StorageError};

/// Options seeded on first run. The API key has no default; it stays
/// absent until the user supplies one.
fn default_settings() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert("theme".to_string(), json!("light"));
    defaults.insert("language".to_string(), json!("en"));
    defaults.insert("focusMinutes".to_string(), json!(25));
    defaults.insert("breakMinutes".to_string(), json!(5));
    defaults.insert("notificationsEnabled".to_string(), json!(true));
    defaults.insert("windowWidth".to_string(), json!(1200));
    defaults.insert("windowHeight".to_string(), json!(800));
    defaults
}

pub struct SettingsStore {
    store: Arc<DocumentStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Seed missing defaults without touching keys that already exist.
    pub fn ensure_defaults(&self) -> Result<(), StorageError> {
        self.store.mutate(|doc| {
            for (key, value) in default_settings() {
                doc.settings.entry(key).or_insert(value);
            }
        })
    }

    /// Value for a key, or the supplied default when absent
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.store
            .read(|doc| doc.settings.get(key).cloned())
            .unwrap_or(default)
    }

    /// The whole settings record
    pub fn get_all(&self) -> Map<String, Value> {
        self.store.read(|doc| doc.settings.clone())
    }

    /// Set a single key, leaving every other key as it was.
    pub fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.store.mutate(|doc| {
            doc.settings.insert(key.to_string(), value);
        })
    }

    /// Remove a single key; absent keys are a no-op.
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.store.mutate(|doc| {
            doc.settings.remove(key);
        })
    }
}
