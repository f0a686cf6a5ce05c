use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_READING_PROGRESS;
use crate::store::{keys, validate_item_id};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub item_id: String,
    pub reading_progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent_seconds: u64,
    pub last_accessed: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

impl Store {
    /// Records reading progress for an item.
    ///
    /// The progress value overwrites the previous one (it may go down),
    /// `delta_time_spent` is added to the running total, and `completed_at`
    /// is stamped the first time progress reaches 100 and never touched again.
    /// Values above 100 are clamped.
    pub fn save_progress(
        &self,
        item_id: &str,
        progress: u8,
        delta_time_spent: u64,
    ) -> Result<ProgressRecord, StoreError> {
        validate_item_id(item_id)?;
        let progress = progress.min(MAX_READING_PROGRESS);

        let _guard = self.lock_updates();
        let mut all: Vec<ProgressRecord> = self.load(keys::USER_PROGRESS)?;
        let now = self.now();
        let reached_end = progress >= MAX_READING_PROGRESS;

        let record = match all.iter_mut().find(|r| r.item_id == item_id) {
            Some(existing) => {
                existing.reading_progress = progress;
                existing.time_spent_seconds =
                    existing.time_spent_seconds.saturating_add(delta_time_spent);
                existing.last_accessed = now;
                if reached_end && existing.completed_at.is_none() {
                    existing.completed_at = Some(now);
                }
                existing.clone()
            }
            None => {
                let record = ProgressRecord {
                    item_id: item_id.to_string(),
                    reading_progress: progress,
                    completed_at: reached_end.then_some(now),
                    time_spent_seconds: delta_time_spent,
                    last_accessed: now,
                };
                all.push(record.clone());
                record
            }
        };

        self.save(keys::USER_PROGRESS, &all)?;
        if reached_end {
            tracing::debug!(item_id, "Item reading completed");
        }
        Ok(record)
    }

    pub fn get_progress(&self, item_id: &str) -> Result<Option<ProgressRecord>, StoreError> {
        let all: Vec<ProgressRecord> = self.load(keys::USER_PROGRESS)?;
        Ok(all.into_iter().find(|r| r.item_id == item_id))
    }

    /// All progress records in insertion order.
    pub fn all_progress(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        self.load(keys::USER_PROGRESS)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use crate::clock::{Clock, ManualClock};
    use crate::store::backend::MemoryBackend;

    use super::*;

    fn store_with_clock() -> (Store, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let store = Store::with_backend(Arc::new(MemoryBackend::new()), clock.clone());
        (store, clock)
    }

    #[test]
    fn first_write_creates_record() {
        let (store, _) = store_with_clock();
        let record = store.save_progress("impact-physics", 35, 20).unwrap();

        assert_eq!(record.reading_progress, 35);
        assert_eq!(record.time_spent_seconds, 20);
        assert!(record.completed_at.is_none());
        assert_eq!(store.get_progress("impact-physics").unwrap(), Some(record));
    }

    #[test]
    fn time_spent_accumulates_and_progress_may_regress() {
        let (store, _) = store_with_clock();
        store.save_progress("neo", 80, 30).unwrap();
        let record = store.save_progress("neo", 40, 15).unwrap();

        assert_eq!(record.reading_progress, 40);
        assert_eq!(record.time_spent_seconds, 45);
    }

    #[test]
    fn completed_at_is_set_once() {
        let (store, clock) = store_with_clock();
        let first = store.save_progress("neo", 100, 0).unwrap();
        let stamped = first.completed_at.expect("completed on first 100");

        clock.advance(Duration::minutes(5));
        store.save_progress("neo", 50, 0).unwrap();
        clock.advance(Duration::minutes(5));
        let again = store.save_progress("neo", 100, 0).unwrap();

        assert_eq!(again.completed_at, Some(stamped));
        assert!(again.last_accessed > stamped);
    }

    #[test]
    fn completion_on_existing_record() {
        let (store, clock) = store_with_clock();
        store.save_progress("neo", 10, 0).unwrap();
        clock.advance(Duration::seconds(90));
        let record = store.save_progress("neo", 100, 5).unwrap();
        assert_eq!(record.completed_at, Some(clock.now()));
    }

    #[test]
    fn progress_above_limit_is_clamped() {
        let (store, _) = store_with_clock();
        let record = store.save_progress("neo", 250, 0).unwrap();
        assert_eq!(record.reading_progress, 100);
        assert!(record.is_completed());
    }

    #[test]
    fn all_progress_keeps_insertion_order() {
        let (store, _) = store_with_clock();
        for id in ["c", "a", "b"] {
            store.save_progress(id, 1, 0).unwrap();
        }
        store.save_progress("a", 50, 0).unwrap();

        let ids: Vec<String> = store
            .all_progress()
            .unwrap()
            .into_iter()
            .map(|r| r.item_id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn unknown_item_is_absent() {
        let (store, _) = store_with_clock();
        assert!(store.get_progress("missing").unwrap().is_none());
    }

    #[test]
    fn corrupt_collection_is_treated_as_empty() {
        let (store, _) = store_with_clock();
        store
            .backend()
            .write(keys::USER_PROGRESS, b"[{\"itemId\":")
            .unwrap();

        assert!(store.all_progress().unwrap().is_empty());
        let record = store.save_progress("neo", 10, 0).unwrap();
        assert_eq!(store.all_progress().unwrap(), vec![record]);
    }
}
