use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::operations::engagement::EngagementRecord;
use crate::store::operations::progress::ProgressRecord;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatistics {
    pub total_items_viewed: usize,
    pub total_completions: usize,
    pub total_time_spent: u64,
    pub favorite_count: usize,
    pub average_progress: f64,
    pub most_viewed_item: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Store {
    pub fn compute_statistics(&self) -> Result<UserStatistics, StoreError> {
        let progress = self.all_progress()?;
        let engagement = self.all_engagement()?;
        let preferences = self.get_preferences()?;

        Ok(UserStatistics {
            total_items_viewed: engagement.len(),
            total_completions: progress.iter().filter(|p| p.is_completed()).count(),
            total_time_spent: engagement
                .iter()
                .map(|e| e.total_time_spent_seconds)
                .fold(0u64, u64::saturating_add),
            favorite_count: preferences.favorite_item_ids.len(),
            average_progress: average_progress(&progress),
            most_viewed_item: most_viewed(&engagement),
            last_activity: last_activity(&progress, &engagement),
        })
    }
}

fn average_progress(progress: &[ProgressRecord]) -> f64 {
    if progress.is_empty() {
        return 0.0;
    }
    let sum: u64 = progress.iter().map(|p| u64::from(p.reading_progress)).sum();
    sum as f64 / progress.len() as f64
}

// Ties go to the record tracked first.
fn most_viewed(engagement: &[EngagementRecord]) -> Option<String> {
    engagement
        .iter()
        .fold(None::<&EngagementRecord>, |best, record| match best {
            Some(best) if best.view_count >= record.view_count => Some(best),
            _ => Some(record),
        })
        .map(|record| record.item_id.clone())
}

fn last_activity(
    progress: &[ProgressRecord],
    engagement: &[EngagementRecord],
) -> Option<DateTime<Utc>> {
    progress
        .iter()
        .map(|p| p.last_accessed)
        .chain(engagement.iter().map(|e| e.last_viewed))
        .max()
}
