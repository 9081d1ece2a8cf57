//! Data models for the persisted study document

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::flashcards::Flashcard;

/// The single on-disk document holding every collection the app persists.
///
/// Read wholesale on startup and rewritten wholesale on every mutation.
/// Every collection defaults to empty so documents written by older
/// builds deserialize cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub sessions: Vec<StudySession>,
    pub flashcards: Vec<Flashcard>,
    pub ai_responses: Vec<AiResponseRecord>,
    pub schedules: Vec<PlannerEntry>,
    pub activities: Vec<ActivityEntry>,
    pub errors: Vec<ErrorEntry>,
    pub settings: Map<String, Value>,
    pub module_states: HashMap<String, ModuleStateEntry>,
}

/// What a study session was spent on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Focus,
    Review,
    Reading,
}

/// A timed study session (focus timer, review pass, reading block)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: Uuid,
    #[serde(default)]
    pub kind: SessionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

/// One generated-text exchange kept for the response history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponseRecord {
    pub id: Uuid,
    pub prompt: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A study-planner entry for a single day.
///
/// Times are minutes into the day; entries without times are all-day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerEntry {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_minute: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_minute: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Activity journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

/// Error journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One module's saved UI snapshot.
///
/// The blob is caller-defined and opaque to the store; a save fully
/// replaces the previous entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStateEntry {
    pub written_at: DateTime<Utc>,
    pub blob: Value,
}
