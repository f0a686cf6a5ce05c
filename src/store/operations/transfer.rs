use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::HashSet;

use crate::constants::{
    EXPORT_FORMAT_VERSION, LEGACY_FORMAT_VERSION, MAX_NOTE_LEN, MAX_READING_PROGRESS,
};
use crate::store::migrate;
use crate::store::{keys, validate_item_id};
use crate::store::operations::engagement::EngagementRecord;
use crate::store::operations::notes::UserNote;
use crate::store::operations::preferences::Preferences;
use crate::store::operations::progress::ProgressRecord;
use crate::store::operations::snapshots::StoredContentSnapshot;
use crate::store::{Store, StoreError};

/// Every user collection in one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub user_progress: Vec<ProgressRecord>,
    pub user_preferences: Preferences,
    pub card_engagement: Vec<EngagementRecord>,
    pub stored_cards: Vec<StoredContentSnapshot>,
    pub user_notes: Vec<UserNote>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

// Absent or null fields leave the matching store untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    user_progress: Option<Vec<ProgressRecord>>,
    user_preferences: Option<Preferences>,
    card_engagement: Option<Vec<EngagementRecord>>,
    stored_cards: Option<Vec<StoredContentSnapshot>>,
    user_notes: Option<Vec<UserNote>>,
}

impl ImportDocument {
    fn field_count(&self) -> usize {
        [
            self.user_progress.is_some(),
            self.user_preferences.is_some(),
            self.card_engagement.is_some(),
            self.stored_cards.is_some(),
            self.user_notes.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

impl Store {
    pub fn export_all(&self) -> Result<ExportDocument, StoreError> {
        Ok(ExportDocument {
            user_progress: self.all_progress()?,
            user_preferences: self.get_preferences()?,
            card_engagement: self.all_engagement()?,
            stored_cards: self.all_snapshots()?,
            user_notes: self.all_notes()?,
            exported_at: self.now(),
            version: EXPORT_FORMAT_VERSION.to_string(),
        })
    }

    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export_all()?)?)
    }

    /// Loads a document produced by [`Store::export_json`] (or by the
    /// browser client).
    ///
    /// Returns `Ok(false)` without touching any store when the document does
    /// not parse, has an unknown version, or any present collection does not
    /// fit its schema. Otherwise every present collection replaces the
    /// stored one and the rest are left alone. Storage failures while
    /// writing are returned as errors.
    pub fn import_all(&self, raw: &str) -> Result<bool, StoreError> {
        let document = match parse_import(raw) {
            Ok(document) => document,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Rejected data import");
                return Ok(false);
            }
        };

        let _guard = self.lock_updates();
        if let Some(progress) = &document.user_progress {
            self.save(keys::USER_PROGRESS, progress)?;
        }
        if let Some(preferences) = &document.user_preferences {
            self.save(keys::USER_PREFERENCES, preferences)?;
        }
        if let Some(engagement) = &document.card_engagement {
            self.save(keys::CARD_ENGAGEMENT, engagement)?;
        }
        if let Some(snapshots) = &document.stored_cards {
            self.save(keys::STORED_CARDS, snapshots)?;
        }
        if let Some(notes) = &document.user_notes {
            self.save(keys::USER_NOTES, notes)?;
        }

        tracing::info!(collections = document.field_count(), "Data import applied");
        Ok(true)
    }
}

fn parse_import(raw: &str) -> Result<ImportDocument, String> {
    let mut value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| "document is not a JSON object".to_string())?;

    let version = match object.get("version") {
        None | Some(Value::Null) => LEGACY_FORMAT_VERSION.to_string(),
        Some(Value::String(version)) => version.clone(),
        Some(other) => return Err(format!("version must be a string, got {other}")),
    };

    match version.as_str() {
        EXPORT_FORMAT_VERSION => {}
        LEGACY_FORMAT_VERSION => migrate::upgrade_legacy_document(object),
        other => return Err(format!("unsupported format version {other}")),
    }

    let mut document: ImportDocument =
        serde_json::from_value(value).map_err(|e| e.to_string())?;
    if let Some(preferences) = document.user_preferences.as_mut() {
        preferences.dedup_favorites();
    }
    document.validate()?;
    Ok(document)
}

impl ImportDocument {
    fn validate(&self) -> Result<(), String> {
        if let Some(progress) = &self.user_progress {
            unique_item_ids("userProgress", progress.iter().map(|r| r.item_id.as_str()))?;
            if let Some(record) = progress
                .iter()
                .find(|r| r.reading_progress > MAX_READING_PROGRESS)
            {
                return Err(format!(
                    "userProgress: {} has progress {} above {}",
                    record.item_id, record.reading_progress, MAX_READING_PROGRESS
                ));
            }
        }
        if let Some(engagement) = &self.card_engagement {
            unique_item_ids("cardEngagement", engagement.iter().map(|r| r.item_id.as_str()))?;
        }
        if let Some(snapshots) = &self.stored_cards {
            unique_item_ids("storedCards", snapshots.iter().map(|s| s.item_id.as_str()))?;
            if let Some(snapshot) = snapshots.iter().find(|s| s.version == 0) {
                return Err(format!("storedCards: {} has version 0", snapshot.item_id));
            }
        }
        if let Some(notes) = &self.user_notes {
            unique_item_ids("userNotes", notes.iter().map(|n| n.item_id.as_str()))?;
            if let Some(note) = notes.iter().find(|n| n.text.len() > MAX_NOTE_LEN) {
                return Err(format!("userNotes: {} exceeds {} bytes", note.item_id, MAX_NOTE_LEN));
            }
        }
        if let Some(preferences) = &self.user_preferences {
            for id in &preferences.favorite_item_ids {
                validate_item_id(id).map_err(|e| format!("userPreferences: {e}"))?;
            }
        }
        Ok(())
    }
}

fn unique_item_ids<'a>(
    collection: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), String> {
    let mut seen = HashSet::new();
    for id in ids {
        validate_item_id(id).map_err(|e| format!("{collection}: {e}"))?;
        if !seen.insert(id) {
            return Err(format!("{collection}: duplicate item id {id}"));
        }
    }
    Ok(())
}
