use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::operations::engagement::EngagementRecord;
use crate::store::operations::progress::ProgressRecord;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurgeSummary {
    pub cutoff: DateTime<Utc>,
    pub progress_removed: usize,
    pub engagement_removed: usize,
}

impl Store {
    /// Drops progress and engagement records not touched in the last
    /// `days_old` days. Preferences, snapshots and notes are kept.
    pub fn purge_older_than(&self, days_old: i64) -> Result<PurgeSummary, StoreError> {
        if days_old < 0 {
            return Err(StoreError::Validation(
                "days_old must not be negative".to_string(),
            ));
        }
        // Ages reaching past the representable range keep every record.
        let cutoff = Duration::try_days(days_old)
            .and_then(|age| self.now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let _guard = self.lock_updates();
        let mut progress: Vec<ProgressRecord> = self.load(keys::USER_PROGRESS)?;
        let progress_before = progress.len();
        progress.retain(|p| p.last_accessed > cutoff);

        let mut engagement: Vec<EngagementRecord> = self.load(keys::CARD_ENGAGEMENT)?;
        let engagement_before = engagement.len();
        engagement.retain(|e| e.last_viewed > cutoff);

        self.save(keys::USER_PROGRESS, &progress)?;
        self.save(keys::CARD_ENGAGEMENT, &engagement)?;

        let summary = PurgeSummary {
            cutoff,
            progress_removed: progress_before - progress.len(),
            engagement_removed: engagement_before - engagement.len(),
        };
        tracing::info!(
            progress_removed = summary.progress_removed,
            engagement_removed = summary.engagement_removed,
            days_old,
            "Purged stale records"
        );
        Ok(summary)
    }

    /// Removes every persisted user document.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock_updates();
        for key in keys::all_keys().filter(|key| *key != keys::SCHEMA_VERSION) {
            self.backend().remove(key)?;
        }
        tracing::info!("Cleared all user data");
        Ok(())
    }
}
