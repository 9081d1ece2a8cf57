//! Review pass state machine
//!
//! A session walks an ordered queue of due cards. Each card starts with
//! its answer concealed and must be revealed before a grade can be
//! submitted; after grading, the session advances to the next card or
//! completes. The session itself performs no I/O; the caller applies
//! each recorded grade through the card store.

use thiserror::Error;
use uuid::Uuid;

use super::models::{Flashcard, ReviewGrade};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Answer is still hidden; reveal the card before grading")]
    AnswerHidden,

    #[error("Current card is already graded")]
    AlreadyGraded,

    #[error("Current card has not been graded yet")]
    NotGraded,

    #[error("Review session is complete")]
    SessionComplete,
}

/// Phase of the card currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    /// Question shown, answer concealed
    Hidden,
    /// Answer revealed
    Revealed,
    /// Grade submitted, waiting to advance
    Graded,
}

/// One review pass over a queue of due cards
pub struct ReviewSession {
    queue: Vec<Flashcard>,
    position: usize,
    phase: CardPhase,
    graded: Vec<(Uuid, ReviewGrade)>,
}

impl ReviewSession {
    /// Start a session over an already-ordered due queue.
    ///
    /// An empty queue yields a session that is complete from the start.
    pub fn new(queue: Vec<Flashcard>) -> Self {
        Self {
            queue,
            position: 0,
            phase: CardPhase::Hidden,
            graded: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// The card currently shown, or None once the session is complete
    pub fn current(&self) -> Option<&Flashcard> {
        self.queue.get(self.position)
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    /// Cards left in the queue, including the one currently shown
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.position)
    }

    /// Grades recorded so far, in review order
    pub fn reviewed(&self) -> &[(Uuid, ReviewGrade)] {
        &self.graded
    }

    /// Reveal the current card's answer.
    ///
    /// Revealing an already-revealed card changes nothing.
    pub fn flip(&mut self) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::SessionComplete);
        }
        match self.phase {
            CardPhase::Hidden => {
                self.phase = CardPhase::Revealed;
                Ok(())
            }
            CardPhase::Revealed => Ok(()),
            CardPhase::Graded => Err(SessionError::AlreadyGraded),
        }
    }

    /// Submit a grade for the current card.
    ///
    /// Only valid once the answer is revealed; returns the graded
    /// card's id so the caller can apply the grade through the store.
    pub fn grade(&mut self, grade: ReviewGrade) -> Result<Uuid, SessionError> {
        if self.is_complete() {
            return Err(SessionError::SessionComplete);
        }
        match self.phase {
            CardPhase::Hidden => Err(SessionError::AnswerHidden),
            CardPhase::Graded => Err(SessionError::AlreadyGraded),
            CardPhase::Revealed => {
                let id = self.queue[self.position].id;
                self.graded.push((id, grade));
                self.phase = CardPhase::Graded;
                Ok(id)
            }
        }
    }

    /// Move past a graded card.
    ///
    /// Returns the next card (concealed again) or None when no due
    /// cards remain and the session is complete. An ungraded card
    /// cannot be skipped.
    pub fn advance(&mut self) -> Result<Option<&Flashcard>, SessionError> {
        if self.is_complete() {
            return Err(SessionError::SessionComplete);
        }
        if self.phase != CardPhase::Graded {
            return Err(SessionError::NotGraded);
        }
        self.position += 1;
        self.phase = CardPhase::Hidden;
        Ok(self.queue.get(self.position))
    }
}
