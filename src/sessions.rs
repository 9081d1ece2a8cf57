//! Study session log
//!
//! Timed sessions (focus blocks, review passes, reading) recorded in the
//! study document. A session is started open-ended and finished later;
//! finishing computes the duration.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{DocumentStore, SessionKind, StorageError, StudySession};

#[derive(Error, Debug)]
pub enum SessionLogError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, SessionLogError>;

pub struct SessionLog {
    store: Arc<DocumentStore>,
}

impl SessionLog {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Start a new session now.
    pub fn start(&self, kind: SessionKind, subject: Option<String>) -> Result<StudySession> {
        let session = StudySession {
            id: Uuid::new_v4(),
            kind,
            subject: subject.filter(|s| !s.trim().is_empty()),
            started_at: Utc::now(),
            ended_at: None,
            duration_minutes: None,
        };

        self.store
            .mutate(|doc| doc.sessions.push(session.clone()))?;
        self.store
            .log_activity("session-started", format!("Session {} started", session.id));

        Ok(session)
    }

    /// Finish a session, recording its end time and duration.
    ///
    /// Finishing an already-finished session leaves it as it was.
    pub fn finish(&self, id: Uuid) -> Result<StudySession> {
        let now = Utc::now();

        let finished = self.store.mutate(|doc| {
            doc.sessions.iter_mut().find(|s| s.id == id).map(|session| {
                if session.ended_at.is_none() {
                    session.ended_at = Some(now);
                    session.duration_minutes = Some((now - session.started_at).num_minutes());
                }
                session.clone()
            })
        })?;

        let session = finished.ok_or(SessionLogError::SessionNotFound(id))?;
        self.store
            .log_activity("session-finished", format!("Session {} finished", id));

        Ok(session)
    }

    /// All sessions, most recent first
    pub fn list(&self) -> Vec<StudySession> {
        let mut sessions = self.store.read(|doc| doc.sessions.clone());
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions
    }

    /// Sessions still running
    pub fn open_sessions(&self) -> Vec<StudySession> {
        self.store.read(|doc| {
            doc.sessions
                .iter()
                .filter(|s| s.ended_at.is_none())
                .cloned()
                .collect()
        })
    }

    /// Delete a session; a missing id is a no-op.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.store.mutate(|doc| {
            doc.sessions.retain(|s| s.id != id);
        })?;
        Ok(())
    }
}
