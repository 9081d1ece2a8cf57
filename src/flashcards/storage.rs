//! Flashcard operations over the study document

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{DocumentStore, StorageError};

use super::algorithm::{apply_grade, select_due_cards};
use super::models::*;
use super::session::ReviewSession;

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// Card store backed by the shared study document
pub struct FlashcardStore {
    store: Arc<DocumentStore>,
}

impl FlashcardStore {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    fn validate_difficulty(difficulty: i32) -> Result<()> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
            return Err(FlashcardError::Validation(format!(
                "Difficulty must be between {} and {}",
                MIN_DIFFICULTY, MAX_DIFFICULTY
            )));
        }
        Ok(())
    }

    // ==================== Card Operations ====================

    /// Create a new card.
    ///
    /// Question and answer are required; both are rejected empty before
    /// anything reaches the scheduler or the store.
    pub fn create_card(
        &self,
        question: &str,
        answer: &str,
        category: Option<String>,
        difficulty: Option<i32>,
    ) -> Result<Flashcard> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() {
            return Err(FlashcardError::Validation(
                "Question must not be empty".to_string(),
            ));
        }
        if answer.is_empty() {
            return Err(FlashcardError::Validation(
                "Answer must not be empty".to_string(),
            ));
        }

        let difficulty = difficulty.unwrap_or(DEFAULT_DIFFICULTY);
        Self::validate_difficulty(difficulty)?;

        let mut card = Flashcard::new(question.to_string(), answer.to_string());
        card.category = category.filter(|c| !c.trim().is_empty());
        card.difficulty = difficulty;

        self.store.mutate(|doc| doc.flashcards.push(card.clone()))?;
        self.store
            .log_activity("flashcard-created", format!("Card {} created", card.id));

        Ok(card)
    }

    /// Get a card by id; absent ids read as None
    pub fn get_card(&self, id: Uuid) -> Option<Flashcard> {
        self.store
            .read(|doc| doc.flashcards.iter().find(|c| c.id == id).cloned())
    }

    /// All cards, in creation order
    pub fn list_cards(&self) -> Vec<Flashcard> {
        self.store.read(|doc| doc.flashcards.clone())
    }

    /// Cards filed under a category
    pub fn list_category(&self, category: &str) -> Vec<Flashcard> {
        self.store.read(|doc| {
            doc.flashcards
                .iter()
                .filter(|c| c.category.as_deref() == Some(category))
                .cloned()
                .collect()
        })
    }

    /// Edit a card's content or classification.
    ///
    /// Memory state is deliberately not editable here; it changes only
    /// through `submit_review`.
    pub fn update_card(&self, id: Uuid, update: CardUpdate) -> Result<Flashcard> {
        if let Some(ref question) = update.question {
            if question.trim().is_empty() {
                return Err(FlashcardError::Validation(
                    "Question must not be empty".to_string(),
                ));
            }
        }
        if let Some(ref answer) = update.answer {
            if answer.trim().is_empty() {
                return Err(FlashcardError::Validation(
                    "Answer must not be empty".to_string(),
                ));
            }
        }
        if let Some(difficulty) = update.difficulty {
            Self::validate_difficulty(difficulty)?;
        }

        let updated = self.store.mutate(|doc| {
            doc.flashcards.iter_mut().find(|c| c.id == id).map(|card| {
                if let Some(question) = update.question {
                    card.question = question.trim().to_string();
                }
                if let Some(answer) = update.answer {
                    card.answer = answer.trim().to_string();
                }
                if let Some(category) = update.category {
                    card.category = Some(category).filter(|c| !c.trim().is_empty());
                }
                if let Some(difficulty) = update.difficulty {
                    card.difficulty = difficulty;
                }
                card.updated_at = Utc::now();
                card.clone()
            })
        })?;

        updated.ok_or(FlashcardError::CardNotFound(id))
    }

    /// Delete a card. Hard delete; a missing id is a no-op.
    pub fn delete_card(&self, id: Uuid) -> Result<()> {
        let removed = self.store.mutate(|doc| {
            let before = doc.flashcards.len();
            doc.flashcards.retain(|c| c.id != id);
            doc.flashcards.len() != before
        })?;

        if removed {
            self.store
                .log_activity("flashcard-deleted", format!("Card {} deleted", id));
        }

        Ok(())
    }

    // ==================== Review Operations ====================

    /// Submit a review grade for a card and persist its new memory state.
    ///
    /// `quality` is the raw grade integer; the scheduler accepts any
    /// value. Unknown card ids are an error here since the review
    /// cannot be applied.
    pub fn submit_review(&self, id: Uuid, quality: i32) -> Result<Flashcard> {
        let now = Utc::now();

        let updated = self.store.mutate(|doc| {
            doc.flashcards.iter_mut().find(|c| c.id == id).map(|card| {
                card.memory = apply_grade(&card.memory, quality, now);
                card.updated_at = now;
                card.clone()
            })
        })?;

        let card = updated.ok_or(FlashcardError::CardNotFound(id))?;
        self.store.log_activity(
            "review",
            format!("Card {} graded {} (next due {})", id, quality, card.memory.next_review_date),
        );

        Ok(card)
    }

    /// Convenience wrapper taking a named grade
    pub fn submit_grade(&self, id: Uuid, grade: ReviewGrade) -> Result<Flashcard> {
        self.submit_review(id, grade.quality())
    }

    /// Cards due as of the given instant, earliest first
    pub fn due_cards(&self, as_of: DateTime<Utc>) -> Vec<Flashcard> {
        self.store
            .read(|doc| select_due_cards(&doc.flashcards, as_of))
    }

    /// Start a review pass over the cards due as of the given instant
    pub fn start_review(&self, as_of: DateTime<Utc>) -> ReviewSession {
        ReviewSession::new(self.due_cards(as_of))
    }

    /// Aggregate statistics over the collection
    pub fn stats(&self, as_of: DateTime<Utc>) -> ReviewStats {
        self.store.read(|doc| {
            let mut stats = ReviewStats {
                total_cards: doc.flashcards.len(),
                ..ReviewStats::default()
            };
            for card in &doc.flashcards {
                if card.memory.is_due(as_of) {
                    stats.due_cards += 1;
                }
                stats.total_reviews += card.memory.review_count as i64;
                stats.total_correct += card.memory.correct_count as i64;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn create_test_store() -> (FlashcardStore, Arc<DocumentStore>, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(DocumentStore::open(temp.path().join("study.json")).unwrap());
        (FlashcardStore::new(Arc::clone(&store)), store, temp)
    }

    #[test]
    fn test_create_and_get_card() {
        let (cards, _, _temp) = create_test_store();

        let card = cards
            .create_card("What is ownership?", "A set of rules on values", None, None)
            .unwrap();
        assert_eq!(card.difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(card.memory.interval, 1);
        assert_eq!(card.memory.review_count, 0);

        let fetched = cards.get_card(card.id).unwrap();
        assert_eq!(fetched.question, "What is ownership?");
    }

    #[test]
    fn test_empty_question_rejected() {
        let (cards, _, _temp) = create_test_store();

        let result = cards.create_card("   ", "answer", None, None);
        assert!(matches!(result, Err(FlashcardError::Validation(_))));

        let result = cards.create_card("question", "", None, None);
        assert!(matches!(result, Err(FlashcardError::Validation(_))));

        assert!(cards.list_cards().is_empty());
    }

    #[test]
    fn test_difficulty_out_of_range_rejected() {
        let (cards, _, _temp) = create_test_store();

        let result = cards.create_card("q", "a", None, Some(4));
        assert!(matches!(result, Err(FlashcardError::Validation(_))));
    }

    #[test]
    fn test_get_missing_card_is_none() {
        let (cards, _, _temp) = create_test_store();
        assert!(cards.get_card(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_card_content() {
        let (cards, _, _temp) = create_test_store();

        let card = cards.create_card("q", "a", None, None).unwrap();
        let updated = cards
            .update_card(
                card.id,
                CardUpdate {
                    question: Some("q2".to_string()),
                    category: Some("rust".to_string()),
                    ..CardUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.question, "q2");
        assert_eq!(updated.answer, "a");
        assert_eq!(updated.category.as_deref(), Some("rust"));
        assert_eq!(cards.list_category("rust").len(), 1);
    }

    #[test]
    fn test_update_missing_card_errors() {
        let (cards, _, _temp) = create_test_store();
        let result = cards.update_card(Uuid::new_v4(), CardUpdate::default());
        assert!(matches!(result, Err(FlashcardError::CardNotFound(_))));
    }

    #[test]
    fn test_delete_card_and_missing_delete_is_noop() {
        let (cards, _, _temp) = create_test_store();

        let card = cards.create_card("q", "a", None, None).unwrap();
        cards.delete_card(card.id).unwrap();
        assert!(cards.get_card(card.id).is_none());

        // Deleting again is fine
        cards.delete_card(card.id).unwrap();
    }

    #[test]
    fn test_submit_review_updates_and_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("study.json");
        let card_id;

        {
            let store = Arc::new(DocumentStore::open(path.clone()).unwrap());
            let cards = FlashcardStore::new(Arc::clone(&store));
            let card = cards.create_card("q", "a", None, None).unwrap();
            card_id = card.id;

            let reviewed = cards.submit_grade(card.id, ReviewGrade::Good).unwrap();
            assert_eq!(reviewed.memory.interval, 6);
            assert_eq!(reviewed.memory.review_count, 1);
            assert_eq!(reviewed.memory.correct_count, 1);
        }

        // Reopen: the review survived the restart
        let store = Arc::new(DocumentStore::open(path).unwrap());
        let cards = FlashcardStore::new(store);
        let card = cards.get_card(card_id).unwrap();
        assert_eq!(card.memory.interval, 6);
        assert_eq!(card.memory.review_count, 1);
    }

    #[test]
    fn test_submit_review_unknown_card_errors() {
        let (cards, _, _temp) = create_test_store();
        let result = cards.submit_review(Uuid::new_v4(), 4);
        assert!(matches!(result, Err(FlashcardError::CardNotFound(_))));
    }

    #[test]
    fn test_due_cards_after_review() {
        let (cards, _, _temp) = create_test_store();
        let now = Utc::now();

        let first = cards.create_card("q1", "a1", None, None).unwrap();
        let second = cards.create_card("q2", "a2", None, None).unwrap();

        // Both start due; grading one pushes it out
        assert_eq!(cards.due_cards(now).len(), 2);
        cards.submit_grade(first.id, ReviewGrade::Good).unwrap();

        let due = cards.due_cards(Utc::now());
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, second.id);

        // Six days out the graded card is back
        let due_later = cards.due_cards(now + Duration::days(7));
        assert_eq!(due_later.len(), 2);
    }

    #[test]
    fn test_stats() {
        let (cards, _, _temp) = create_test_store();

        let card = cards.create_card("q", "a", None, None).unwrap();
        cards.create_card("q2", "a2", None, None).unwrap();
        cards.submit_grade(card.id, ReviewGrade::Good).unwrap();
        cards.submit_grade(card.id, ReviewGrade::Again).unwrap();

        let stats = cards.stats(Utc::now());
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.total_correct, 1);
    }

    #[test]
    fn test_start_review_walks_due_queue() {
        let (cards, _, _temp) = create_test_store();

        cards.create_card("q1", "a1", None, None).unwrap();
        cards.create_card("q2", "a2", None, None).unwrap();

        let mut session = cards.start_review(Utc::now());
        assert_eq!(session.remaining(), 2);

        while !session.is_complete() {
            session.flip().unwrap();
            let id = session.grade(ReviewGrade::Good).unwrap();
            cards.submit_grade(id, ReviewGrade::Good).unwrap();
            session.advance().unwrap();
        }

        assert!(cards.due_cards(Utc::now()).is_empty());
    }
}
