//! Whole-document JSON persistence
//!
//! The study data lives in one JSON document that is read in full on open
//! and rewritten in full on every mutating call. Writes are serialized
//! behind the store mutex, so mutations land on disk in the order they
//! were issued. A failed persist leaves the previous file intact; the
//! in-memory document stays valid and is written out by the next
//! successful persist.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{ActivityEntry, Document, ErrorEntry};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Store for the single study document
pub struct DocumentStore {
    path: PathBuf,
    document: Mutex<Document>,
}

impl DocumentStore {
    /// Open the document at `path`, creating it if missing.
    ///
    /// A file that cannot be parsed is logged and reinitialized empty
    /// rather than refusing to start.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let document = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(document) => document,
                Err(e) => {
                    log::warn!(
                        "Study document at {} is unreadable ({}); reinitializing empty",
                        path.display(),
                        e
                    );
                    Document::default()
                }
            }
        } else {
            Document::default()
        };

        let store = Self {
            path,
            document: Mutex::new(document),
        };

        // First run: put the empty document on disk right away
        if !store.path.exists() {
            store.persist(&store.doc())?;
        }

        Ok(store)
    }

    /// Default data directory for the app
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("recall"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Open the document at its default location
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_data_dir()?.join("study.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        // A poisoned lock still yields the document; the data itself is
        // kept consistent by whole-value mutations.
        match self.document.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Run a closure against the current document.
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        f(&self.doc())
    }

    /// Apply a mutation and persist the whole document.
    ///
    /// The mutation and the persist happen under the store mutex, so
    /// concurrent callers cannot reorder or lose each other's writes.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Document) -> T) -> Result<T> {
        let mut doc = self.doc();
        let out = f(&mut doc);
        self.persist(&doc)?;
        Ok(out)
    }

    /// Replace the document with an empty one and persist it.
    pub fn reset(&self) -> Result<()> {
        self.mutate(|doc| *doc = Document::default())
    }

    /// Save using atomic write (write to .tmp then rename)
    fn persist(&self, document: &Document) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    // ===== Activity / error journal =====

    /// Append an activity entry.
    ///
    /// Journalling is best-effort: a failed write is logged and dropped
    /// so it never takes the calling operation down with it.
    pub fn log_activity(&self, kind: &str, detail: impl Into<String>) {
        let entry = ActivityEntry {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            detail: detail.into(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.mutate(|doc| doc.activities.push(entry)) {
            log::warn!("Failed to record activity: {}", e);
        }
    }

    /// Append an error entry, best-effort like `log_activity`.
    pub fn log_error(&self, message: &str, context: Option<String>) {
        log::error!("{}", message);
        let entry = ErrorEntry {
            id: Uuid::new_v4(),
            message: message.to_string(),
            context,
            created_at: Utc::now(),
        };
        if let Err(e) = self.mutate(|doc| doc.errors.push(entry)) {
            log::warn!("Failed to record error entry: {}", e);
        }
    }

    /// Most recent activity entries, newest first
    pub fn recent_activities(&self, limit: usize) -> Vec<ActivityEntry> {
        self.read(|doc| doc.activities.iter().rev().take(limit).cloned().collect())
    }

    /// Most recent error entries, newest first
    pub fn recent_errors(&self, limit: usize) -> Vec<ErrorEntry> {
        self.read(|doc| doc.errors.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(temp: &TempDir) -> PathBuf {
        temp.path().join("study.json")
    }

    #[test]
    fn test_open_missing_file_initializes_empty() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(store_path(&temp)).unwrap();

        assert!(store.path().exists());
        assert_eq!(store.read(|doc| doc.flashcards.len()), 0);
        assert_eq!(store.read(|doc| doc.activities.len()), 0);
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);

        {
            let store = DocumentStore::open(path.clone()).unwrap();
            store
                .mutate(|doc| {
                    doc.settings
                        .insert("theme".to_string(), serde_json::json!("dark"));
                })
                .unwrap();
        }

        let reopened = DocumentStore::open(path).unwrap();
        assert_eq!(
            reopened.read(|doc| doc.settings.get("theme").cloned()),
            Some(serde_json::json!("dark"))
        );
    }

    #[test]
    fn test_corrupt_file_reinitializes() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);
        fs::write(&path, "{ not json at all").unwrap();

        let store = DocumentStore::open(path).unwrap();
        assert_eq!(store.read(|doc| doc.flashcards.len()), 0);

        // And the store is writable again afterwards
        store
            .mutate(|doc| doc.activities.push(ActivityEntry {
                id: Uuid::new_v4(),
                kind: "test".to_string(),
                detail: "recovered".to_string(),
                created_at: Utc::now(),
            }))
            .unwrap();
        assert_eq!(store.recent_activities(10).len(), 1);
    }

    #[test]
    fn test_unknown_collections_tolerated() {
        let temp = TempDir::new().unwrap();
        let path = store_path(&temp);
        // A document written by a build that had extra collections
        fs::write(&path, r#"{"flashcards": [], "futureCollection": [1, 2]}"#).unwrap();

        let store = DocumentStore::open(path).unwrap();
        assert_eq!(store.read(|doc| doc.flashcards.len()), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(store_path(&temp)).unwrap();

        store.log_activity("test", "before reset");
        store
            .mutate(|doc| {
                doc.settings
                    .insert("theme".to_string(), serde_json::json!("dark"));
            })
            .unwrap();

        store.reset().unwrap();

        assert_eq!(store.recent_activities(10).len(), 0);
        assert!(store.read(|doc| doc.settings.is_empty()));
    }

    #[test]
    fn test_journal_order_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(store_path(&temp)).unwrap();

        store.log_activity("test", "first");
        store.log_activity("test", "second");
        store.log_error("boom", Some("unit".to_string()));

        let activities = store.recent_activities(10);
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].detail, "second");
        assert_eq!(activities[1].detail, "first");

        let errors = store.recent_errors(10);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "boom");
        assert_eq!(errors[0].context.as_deref(), Some("unit"));
    }
}
