//! Study planner
//!
//! Per-day planner entries in the study document. Entries carry optional
//! start/end times as minutes into the day; entries without times are
//! all-day and sort after timed ones.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::{DocumentStore, PlannerEntry, StorageError};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Planner entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

pub struct SchedulePlanner {
    store: Arc<DocumentStore>,
}

impl SchedulePlanner {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Add a planner entry for a day.
    pub fn add(
        &self,
        title: &str,
        date: NaiveDate,
        start_minute: Option<u32>,
        end_minute: Option<u32>,
    ) -> Result<PlannerEntry> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ScheduleError::Validation(
                "Title must not be empty".to_string(),
            ));
        }
        for minute in [start_minute, end_minute].into_iter().flatten() {
            if minute >= MINUTES_PER_DAY {
                return Err(ScheduleError::Validation(format!(
                    "Time must be below {} minutes",
                    MINUTES_PER_DAY
                )));
            }
        }
        if let (Some(start), Some(end)) = (start_minute, end_minute) {
            if end < start {
                return Err(ScheduleError::Validation(
                    "End time must not be before start time".to_string(),
                ));
            }
        }

        let entry = PlannerEntry {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date,
            start_minute,
            end_minute,
            completed: false,
            created_at: Utc::now(),
        };

        self.store.mutate(|doc| doc.schedules.push(entry.clone()))?;
        self.store
            .log_activity("planner-entry-added", format!("Entry {} added", entry.id));

        Ok(entry)
    }

    /// All entries, in creation order
    pub fn list(&self) -> Vec<PlannerEntry> {
        self.store.read(|doc| doc.schedules.clone())
    }

    /// Entries for one day, timed entries first in start order
    pub fn entries_for(&self, date: NaiveDate) -> Vec<PlannerEntry> {
        let mut entries: Vec<PlannerEntry> = self.store.read(|doc| {
            doc.schedules
                .iter()
                .filter(|e| e.date == date)
                .cloned()
                .collect()
        });
        entries.sort_by_key(|e| (e.start_minute.is_none(), e.start_minute));
        entries
    }

    /// Mark an entry completed or not.
    pub fn set_completed(&self, id: Uuid, completed: bool) -> Result<PlannerEntry> {
        let updated = self.store.mutate(|doc| {
            doc.schedules.iter_mut().find(|e| e.id == id).map(|entry| {
                entry.completed = completed;
                entry.clone()
            })
        })?;

        updated.ok_or(ScheduleError::EntryNotFound(id))
    }

    /// Remove an entry; a missing id is a no-op.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.store.mutate(|doc| {
            doc.schedules.retain(|e| e.id != id);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_planner() -> (SchedulePlanner, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(DocumentStore::open(temp.path().join("study.json")).unwrap());
        (SchedulePlanner::new(store), temp)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_and_list_for_day() {
        let (planner, _temp) = create_test_planner();
        let monday = day(2026, 3, 2);

        planner
            .add("Revise chapter 4", monday, Some(9 * 60), Some(10 * 60))
            .unwrap();
        planner.add("Mock exam", day(2026, 3, 3), None, None).unwrap();

        assert_eq!(planner.entries_for(monday).len(), 1);
        assert_eq!(planner.list().len(), 2);
    }

    #[test]
    fn test_entries_sorted_timed_first() {
        let (planner, _temp) = create_test_planner();
        let date = day(2026, 3, 2);

        planner.add("All day", date, None, None).unwrap();
        planner.add("Late", date, Some(14 * 60), None).unwrap();
        planner.add("Early", date, Some(8 * 60), None).unwrap();

        let entries = planner.entries_for(date);
        assert_eq!(entries[0].title, "Early");
        assert_eq!(entries[1].title, "Late");
        assert_eq!(entries[2].title, "All day");
    }

    #[test]
    fn test_validation() {
        let (planner, _temp) = create_test_planner();
        let date = day(2026, 3, 2);

        assert!(matches!(
            planner.add("  ", date, None, None),
            Err(ScheduleError::Validation(_))
        ));
        assert!(matches!(
            planner.add("x", date, Some(25 * 60), None),
            Err(ScheduleError::Validation(_))
        ));
        assert!(matches!(
            planner.add("x", date, Some(600), Some(540)),
            Err(ScheduleError::Validation(_))
        ));
    }

    #[test]
    fn test_set_completed() {
        let (planner, _temp) = create_test_planner();

        let entry = planner.add("Task", day(2026, 3, 2), None, None).unwrap();
        let updated = planner.set_completed(entry.id, true).unwrap();
        assert!(updated.completed);

        assert!(matches!(
            planner.set_completed(Uuid::new_v4(), true),
            Err(ScheduleError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let (planner, _temp) = create_test_planner();

        let entry = planner.add("Task", day(2026, 3, 2), None, None).unwrap();
        planner.remove(entry.id).unwrap();
        assert!(planner.list().is_empty());

        planner.remove(entry.id).unwrap();
    }
}
