use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ContentBlock, ContentSource};
use crate::store::{keys, validate_item_id};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredContentSnapshot {
    pub item_id: String,
    pub content: Vec<ContentBlock>,
    pub last_updated: DateTime<Utc>,
    pub source: ContentSource,
    /// Starts at 1, bumped on every overwrite.
    pub version: u32,
}

impl Store {
    pub fn store_snapshot(
        &self,
        item_id: &str,
        content: Vec<ContentBlock>,
        source: ContentSource,
    ) -> Result<StoredContentSnapshot, StoreError> {
        validate_item_id(item_id)?;

        let _guard = self.lock_updates();
        let mut all: Vec<StoredContentSnapshot> = self.load(keys::STORED_CARDS)?;
        let existing = all.iter().position(|s| s.item_id == item_id);

        let snapshot = StoredContentSnapshot {
            item_id: item_id.to_string(),
            content,
            last_updated: self.now(),
            source,
            version: existing.map_or(1, |i| all[i].version.saturating_add(1)),
        };

        match existing {
            Some(index) => all[index] = snapshot.clone(),
            None => all.push(snapshot.clone()),
        }

        self.save(keys::STORED_CARDS, &all)?;
        tracing::debug!(item_id, version = snapshot.version, ?source, "Content snapshot stored");
        Ok(snapshot)
    }

    pub fn get_snapshot(&self, item_id: &str) -> Result<Option<StoredContentSnapshot>, StoreError> {
        let all: Vec<StoredContentSnapshot> = self.load(keys::STORED_CARDS)?;
        Ok(all.into_iter().find(|s| s.item_id == item_id))
    }

    pub fn all_snapshots(&self) -> Result<Vec<StoredContentSnapshot>, StoreError> {
        self.load(keys::STORED_CARDS)
    }
}
