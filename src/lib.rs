//! Core of the Recall study assistant
//!
//! Everything under the UI shell: the flashcard scheduler and review
//! sessions, the study-session and planner journals, per-module UI
//! state, settings, and the text-generation client, all over a single
//! JSON study document.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

pub mod ai;
pub mod flashcards;
pub mod module_state;
pub mod schedule;
pub mod sessions;
pub mod settings;
pub mod storage;

use ai::{GenerationConfig, GenerationError, TextGenClient};
use flashcards::FlashcardStore;
use module_state::ModuleStateCache;
use schedule::SchedulePlanner;
use sessions::SessionLog;
use settings::SettingsStore;
use storage::{AiResponseRecord, DocumentStore, StorageError};

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("AI client error: {0}")]
    Ai(#[from] GenerationError),
}

/// Shared context threaded through the application.
///
/// Constructed once at startup and handed to whichever component needs
/// it; nothing in here is global. All stores share one document store,
/// so their writes land on disk in the order they were issued.
pub struct AppContext {
    pub store: Arc<DocumentStore>,
    pub settings: SettingsStore,
    pub module_states: ModuleStateCache,
    pub flashcards: FlashcardStore,
    pub sessions: SessionLog,
    pub planner: SchedulePlanner,
    pub ai: TextGenClient,
}

impl AppContext {
    /// Open the study document at `document_path` and build the context
    /// around it, seeding first-run settings defaults.
    pub fn open(document_path: PathBuf) -> Result<Self, ContextError> {
        let store = Arc::new(DocumentStore::open(document_path)?);

        let settings = SettingsStore::new(Arc::clone(&store));
        settings.ensure_defaults()?;

        Ok(Self {
            settings,
            module_states: ModuleStateCache::new(Arc::clone(&store)),
            flashcards: FlashcardStore::new(Arc::clone(&store)),
            sessions: SessionLog::new(Arc::clone(&store)),
            planner: SchedulePlanner::new(Arc::clone(&store)),
            ai: TextGenClient::new()?,
            store,
        })
    }

    /// Open the context over the default data directory
    pub fn open_default() -> Result<Self, ContextError> {
        let path = DocumentStore::default_data_dir()?.join("study.json");
        Self::open(path)
    }

    /// Generate text and record the exchange in the response history.
    ///
    /// No store lock is held across the HTTP call. A failed history
    /// append degrades to a warning and the generated text is still
    /// returned; a failed generation is journalled to the error log.
    pub async fn generate_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError> {
        let result = self.ai.generate(prompt, config).await;

        match &result {
            Ok(response) => {
                let record = AiResponseRecord {
                    id: Uuid::new_v4(),
                    prompt: prompt.to_string(),
                    response: response.clone(),
                    model: config.model.clone(),
                    created_at: Utc::now(),
                };
                if let Err(e) = self.store.mutate(|doc| doc.ai_responses.push(record)) {
                    log::warn!("Failed to record AI response: {}", e);
                }
            }
            Err(e) => {
                self.store
                    .log_error(&format!("Text generation failed: {}", e), Some("ai".to_string()));
            }
        }

        result
    }

    /// Most recent generated-text exchanges, newest first
    pub fn response_history(&self, limit: usize) -> Vec<AiResponseRecord> {
        self.store
            .read(|doc| doc.ai_responses.iter().rev().take(limit).cloned().collect())
    }
}
