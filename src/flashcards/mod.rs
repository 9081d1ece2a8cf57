//! Flashcards and spaced repetition
//!
//! This module provides:
//! - Flashcard CRUD over the study document
//! - The review scheduler (grade -> new memory state)
//! - Due-card selection
//! - The review pass state machine

pub mod algorithm;
pub mod models;
pub mod session;
pub mod storage;

pub use models::*;
pub use session::{CardPhase, ReviewSession, SessionError};
pub use storage::{FlashcardError, FlashcardStore};
