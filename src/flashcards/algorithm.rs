//! Spaced repetition scheduling
//!
//! Interval update in the SuperMemo-2 family: a remembered card grows its
//! interval by the ease factor, a forgotten card resets to one day. The
//! ease adjustment EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)) is
//! applied on both branches, so a failed review lowers the ease factor
//! through the same expression instead of a separate penalty.
//!
//! Grades:
//! - 1: again (forgotten)
//! - 3: hard (remembered with serious difficulty)
//! - 4: good (remembered after hesitation)
//! - 5: easy (perfect recall)

use chrono::{DateTime, Duration, Utc};

use super::models::{Flashcard, MemoryState};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// Interval assigned when a card graduates past its first interval
const GRADUATION_INTERVAL: i32 = 6;

/// Apply a review grade to a card's memory state.
///
/// Pure arithmetic with no failure modes: any integer grade yields a
/// defined result. Only `grade >= 3` vs `grade < 3` changes the branch;
/// values far outside 1-5 feed the same formula and can produce
/// degenerate (but accepted) ease factors and intervals.
pub fn apply_grade(state: &MemoryState, grade: i32, now: DateTime<Utc>) -> MemoryState {
    let remembered = grade >= 3;

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), both branches
    let spread = (5 - grade) as f32;
    let ease = state.ease_factor + (0.1 - spread * (0.08 + spread * 0.02));

    let interval = if remembered {
        if state.interval == 1 {
            // Fixed graduation step from "new" to "young"
            GRADUATION_INTERVAL
        } else {
            // Growth uses the updated ease factor before the floor lands
            (state.interval as f32 * ease).round() as i32
        }
    } else {
        1
    };

    MemoryState {
        ease_factor: ease.max(MIN_EASE_FACTOR),
        interval,
        review_count: state.review_count + 1,
        correct_count: if remembered {
            state.correct_count + 1
        } else {
            state.correct_count
        },
        next_review_date: now + Duration::days(interval as i64),
    }
}

/// Select the cards due for review as of the given instant.
///
/// Earliest-due first; cards sharing a due date keep their input order.
/// The input is left untouched, so the selection can be recomputed.
pub fn select_due_cards(cards: &[Flashcard], as_of: DateTime<Utc>) -> Vec<Flashcard> {
    let mut due: Vec<Flashcard> = cards
        .iter()
        .filter(|card| card.memory.is_due(as_of))
        .cloned()
        .collect();

    due.sort_by(|a, b| a.memory.next_review_date.cmp(&b.memory.next_review_date));
    due
}

/// Intervals each grade would produce, for labelling the grade buttons
/// (again, hard, good, easy).
pub fn preview_intervals(state: &MemoryState) -> [i32; 4] {
    let now = Utc::now();
    [
        apply_grade(state, 1, now).interval,
        apply_grade(state, 3, now).interval,
        apply_grade(state, 4, now).interval,
        apply_grade(state, 5, now).interval,
    ]
}
