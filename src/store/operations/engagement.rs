use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{keys, validate_item_id};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngagementAction {
    View,
    Expand,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    pub item_id: String,
    pub view_count: u64,
    pub expand_count: u64,
    pub complete_count: u64,
    pub total_time_spent_seconds: u64,
    pub last_viewed: DateTime<Utc>,
}

impl EngagementRecord {
    fn empty(item_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.to_string(),
            view_count: 0,
            expand_count: 0,
            complete_count: 0,
            total_time_spent_seconds: 0,
            last_viewed: now,
        }
    }

    fn apply(&mut self, action: EngagementAction, delta_time_spent: u64, now: DateTime<Utc>) {
        let counter = match action {
            EngagementAction::View => &mut self.view_count,
            EngagementAction::Expand => &mut self.expand_count,
            EngagementAction::Complete => &mut self.complete_count,
        };
        *counter = counter.saturating_add(1);
        self.total_time_spent_seconds = self.total_time_spent_seconds.saturating_add(delta_time_spent);
        self.last_viewed = now;
    }
}

impl Store {
    pub fn track_engagement(
        &self,
        item_id: &str,
        action: EngagementAction,
        delta_time_spent: u64,
    ) -> Result<EngagementRecord, StoreError> {
        validate_item_id(item_id)?;

        let _guard = self.lock_updates();
        let mut all: Vec<EngagementRecord> = self.load(keys::CARD_ENGAGEMENT)?;
        let now = self.now();

        let index = match all.iter().position(|r| r.item_id == item_id) {
            Some(index) => index,
            None => {
                all.push(EngagementRecord::empty(item_id, now));
                all.len() - 1
            }
        };
        all[index].apply(action, delta_time_spent, now);
        let record = all[index].clone();

        self.save(keys::CARD_ENGAGEMENT, &all)?;
        tracing::trace!(item_id, ?action, "Engagement tracked");
        Ok(record)
    }

    pub fn get_engagement(&self, item_id: &str) -> Result<Option<EngagementRecord>, StoreError> {
        let all: Vec<EngagementRecord> = self.load(keys::CARD_ENGAGEMENT)?;
        Ok(all.into_iter().find(|r| r.item_id == item_id))
    }

    pub fn all_engagement(&self) -> Result<Vec<EngagementRecord>, StoreError> {
        self.load(keys::CARD_ENGAGEMENT)
    }
}
