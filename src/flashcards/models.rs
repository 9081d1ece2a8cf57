//! Data models for the flashcard system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty levels a card can be filed under (1 easiest, 3 hardest)
pub const MIN_DIFFICULTY: i32 = 1;
pub const MAX_DIFFICULTY: i32 = 3;
pub const DEFAULT_DIFFICULTY: i32 = 2;

/// A flashcard with its question, answer, and scheduling state.
///
/// The memory-state fields are flattened into the card record, so the
/// serialized form carries `easeFactor`, `interval`, `reviewCount`,
/// `correctCount`, and `nextReviewDate` directly on the card object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: i32,
    #[serde(flatten)]
    pub memory: MemoryState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(question: String, answer: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            question,
            answer,
            category: None,
            difficulty: DEFAULT_DIFFICULTY,
            memory: MemoryState::new(now),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Scheduling state for a card, mutated only by the review scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    /// Multiplier controlling interval growth (never below 1.3)
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// Current interval in days
    #[serde(default = "default_interval")]
    pub interval: i32,
    /// Total number of reviews
    #[serde(default)]
    pub review_count: i32,
    /// Number of remembered reviews
    #[serde(default)]
    pub correct_count: i32,
    /// When the card is next due
    pub next_review_date: DateTime<Utc>,
}

fn default_ease_factor() -> f32 {
    2.5
}

fn default_interval() -> i32 {
    1
}

fn default_difficulty() -> i32 {
    DEFAULT_DIFFICULTY
}

impl MemoryState {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            ease_factor: default_ease_factor(),
            interval: default_interval(),
            review_count: 0,
            correct_count: 0,
            next_review_date: created_at,
        }
    }

    /// Check if the card is due as of the given instant
    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_date <= as_of
    }
}

/// User-facing recall grades, mapped onto the scheduler's quality scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewGrade {
    /// Forgotten; the card resets
    Again,
    /// Remembered with serious difficulty
    Hard,
    /// Remembered after hesitation
    Good,
    /// Perfect recall
    Easy,
}

impl ReviewGrade {
    /// Quality value fed to the scheduler
    pub fn quality(self) -> i32 {
        match self {
            ReviewGrade::Again => 1,
            ReviewGrade::Hard => 3,
            ReviewGrade::Good => 4,
            ReviewGrade::Easy => 5,
        }
    }
}

/// Fields of a card a caller may edit; memory state is not among them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<i32>,
}

/// Aggregate statistics over the card collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub total_reviews: i64,
    pub total_correct: i64,
}
