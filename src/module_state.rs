//! Per-module UI state cache
//!
//! UI modules stash an opaque snapshot here when the user navigates away
//! and read it back on activation. A save fully replaces the previous
//! entry; the blob's shape is the owning module's concern, so retrieval
//! hands it back as-is and never fails on a name that was never saved.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::storage::{DocumentStore, ModuleStateEntry, StorageError};

pub struct ModuleStateCache {
    store: Arc<DocumentStore>,
}

impl ModuleStateCache {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Save a module's snapshot, replacing any previous entry outright.
    pub fn save_state(&self, module: &str, blob: Value) -> Result<(), StorageError> {
        let entry = ModuleStateEntry {
            written_at: Utc::now(),
            blob,
        };
        self.store.mutate(|doc| {
            doc.module_states.insert(module.to_string(), entry);
        })
    }

    /// The most recent snapshot for a module, or None if it never saved one.
    pub fn get_state(&self, module: &str) -> Option<Value> {
        self.store
            .read(|doc| doc.module_states.get(module).map(|e| e.blob.clone()))
    }

    /// When the module's snapshot was written, if one exists
    pub fn written_at(&self, module: &str) -> Option<DateTime<Utc>> {
        self.store
            .read(|doc| doc.module_states.get(module).map(|e| e.written_at))
    }

    /// Module names with a saved snapshot
    pub fn modules(&self) -> Vec<String> {
        self.store
            .read(|doc| doc.module_states.keys().cloned().collect())
    }

    /// Drop a module's snapshot; absent names are a no-op.
    pub fn clear(&self, module: &str) -> Result<(), StorageError> {
        self.store.mutate(|doc| {
            doc.module_states.remove(module);
        })
    }
}
