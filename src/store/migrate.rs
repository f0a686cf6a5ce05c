//! Schema versioning for persisted collections and import documents.
//!
//! The browser client stored documents in a looser layout (`cardId`,
//! `views`, `favoriteCards`, notes keyed by card id, untagged content items).
//! The `upgrade_*` functions rewrite that layout into the current one. They
//! only touch fields still in the old shape, so running them over current
//! data changes nothing.

use serde_json::{Map, Value};

use crate::constants::MAX_READING_PROGRESS;
use crate::store::keys;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_legacy_layout", m002_legacy_layout),
    ]
}

/// Applies every migration newer than the stored schema version.
///
/// Each migration is idempotent: a crash between running it and recording
/// the new version makes it run again on the next start.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.backend().read(keys::SCHEMA_VERSION)? {
        Some(raw) => Ok(serde_json::from_slice::<u32>(&raw).unwrap_or(0)),
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }
    store.save(keys::SCHEMA_VERSION, &version)
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

fn m002_legacy_layout(store: &Store) -> Result<(), StoreError> {
    let upgrades: [(&str, fn(&mut Value)); 5] = [
        (keys::USER_PROGRESS, upgrade_progress),
        (keys::USER_PREFERENCES, upgrade_preferences),
        (keys::CARD_ENGAGEMENT, upgrade_engagement),
        (keys::STORED_CARDS, upgrade_snapshots),
        (keys::USER_NOTES, upgrade_notes),
    ];

    for (key, upgrade) in upgrades {
        let Some(raw) = store.backend().read(key)? else {
            continue;
        };
        let mut value: Value = match serde_json::from_slice(&raw) {
            Ok(value) => value,
            Err(error) => {
                // Reads already treat this as empty; leave the bytes alone.
                tracing::warn!(key, error = %error, "Skipping unreadable document during migration");
                continue;
            }
        };
        let before = value.clone();
        upgrade(&mut value);
        if value != before {
            store.save(key, &value)?;
            tracing::info!(key, "Upgraded legacy document layout");
        }
    }

    Ok(())
}

/// Upgrades every collection present in a legacy export document in place.
pub fn upgrade_legacy_document(document: &mut Map<String, Value>) {
    let upgrades: [(&str, fn(&mut Value)); 5] = [
        ("userProgress", upgrade_progress),
        ("userPreferences", upgrade_preferences),
        ("cardEngagement", upgrade_engagement),
        ("storedCards", upgrade_snapshots),
        ("userNotes", upgrade_notes),
    ];
    for (field, upgrade) in upgrades {
        if let Some(value) = document.get_mut(field) {
            upgrade(value);
        }
    }
}

pub fn upgrade_progress(value: &mut Value) {
    for record in objects_mut(value) {
        rename_field(record, "cardId", "itemId");
        rename_field(record, "timeSpent", "timeSpentSeconds");
        normalize_uint(record, "timeSpentSeconds", None);
        normalize_uint(record, "readingProgress", Some(u64::from(MAX_READING_PROGRESS)));
    }
}

pub fn upgrade_preferences(value: &mut Value) {
    if let Some(prefs) = value.as_object_mut() {
        rename_field(prefs, "favoriteCards", "favoriteItemIds");
        rename_field(prefs, "difficulty", "difficultyFilter");
    }
}

pub fn upgrade_engagement(value: &mut Value) {
    for record in objects_mut(value) {
        rename_field(record, "cardId", "itemId");
        rename_field(record, "views", "viewCount");
        rename_field(record, "expansions", "expandCount");
        rename_field(record, "completions", "completeCount");
        rename_field(record, "totalTimeSpent", "totalTimeSpentSeconds");
        for field in ["viewCount", "expandCount", "completeCount", "totalTimeSpentSeconds"] {
            normalize_uint(record, field, None);
        }
    }
}

pub fn upgrade_snapshots(value: &mut Value) {
    for snapshot in objects_mut(value) {
        rename_field(snapshot, "id", "itemId");
        if let Some(content) = snapshot.get_mut("content") {
            for block in objects_mut(content) {
                if block.contains_key("kind") {
                    continue;
                }
                block.remove("icon");
                block.remove("type");
                block.insert("kind".to_string(), Value::String("fact".to_string()));
            }
        }
    }
}

/// Notes used to be an object keyed by card id with a `note` field.
pub fn upgrade_notes(value: &mut Value) {
    let Value::Object(by_id) = value else {
        return;
    };
    let notes: Vec<Value> = std::mem::take(by_id)
        .into_iter()
        .map(|(item_id, note)| {
            let mut note = match note {
                Value::Object(fields) => fields,
                _ => Map::new(),
            };
            rename_field(&mut note, "note", "text");
            note.insert("itemId".to_string(), Value::String(item_id));
            Value::Object(note)
        })
        .collect();
    *value = Value::Array(notes);
}

fn objects_mut(value: &mut Value) -> impl Iterator<Item = &mut Map<String, Value>> {
    value
        .as_array_mut()
        .into_iter()
        .flat_map(|items| items.iter_mut())
        .filter_map(Value::as_object_mut)
}

fn rename_field(object: &mut Map<String, Value>, from: &str, to: &str) {
    if object.contains_key(to) {
        return;
    }
    if let Some(value) = object.remove(from) {
        object.insert(to.to_string(), value);
    }
}

// The browser client wrote JS numbers, which may carry fractions.
fn normalize_uint(object: &mut Map<String, Value>, field: &str, max: Option<u64>) {
    let Some(number) = object.get(field).and_then(Value::as_f64) else {
        return;
    };
    if object.get(field).and_then(Value::as_u64).is_some() && max.is_none() {
        return;
    }
    let mut rounded = number.round().max(0.0) as u64;
    if let Some(max) = max {
        rounded = rounded.min(max);
    }
    object.insert(field.to_string(), Value::from(rounded));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::store::operations::engagement::EngagementRecord;
    use crate::store::operations::notes::UserNote;
    use crate::store::operations::progress::ProgressRecord;

    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");
        let store = Store::open(path.to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let first = get_current_version(&store).unwrap();
        run(&store).unwrap();
        let second = get_current_version(&store).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
    }

    #[test]
    fn downgrade_is_rejected() {
        let store = Store::in_memory();
        set_version(&store, 3).unwrap();
        let err = set_version(&store, 2).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn legacy_collections_are_rewritten_on_startup() {
        let store = Store::in_memory();
        let legacy_progress = json!([{
            "cardId": "scientific-physics",
            "readingProgress": 99.6,
            "timeSpent": 12.4,
            "lastAccessed": "2024-10-01T10:00:00.000Z"
        }]);
        let legacy_notes = json!({
            "scientific-physics": {
                "note": "E = ½mv²",
                "createdAt": "2024-10-01T10:00:00.000Z",
                "updatedAt": "2024-10-02T10:00:00.000Z"
            }
        });
        store.save(keys::USER_PROGRESS, &legacy_progress).unwrap();
        store.save(keys::USER_NOTES, &legacy_notes).unwrap();

        run(&store).unwrap();

        let progress: Vec<ProgressRecord> = store.all_progress().unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].item_id, "scientific-physics");
        assert_eq!(progress[0].reading_progress, 100);
        assert_eq!(progress[0].time_spent_seconds, 12);

        let notes: Vec<UserNote> = store.all_notes().unwrap();
        assert_eq!(notes[0].item_id, "scientific-physics");
        assert_eq!(notes[0].text, "E = ½mv²");
    }

    #[test]
    fn upgrade_leaves_current_layout_untouched() {
        let mut current = json!([{
            "itemId": "x",
            "viewCount": 2,
            "expandCount": 0,
            "completeCount": 1,
            "totalTimeSpentSeconds": 0,
            "lastViewed": "2024-10-01T10:00:00Z"
        }]);
        let before = current.clone();
        upgrade_engagement(&mut current);
        assert_eq!(current, before);

        let parsed: Vec<EngagementRecord> = serde_json::from_value(current).unwrap();
        assert_eq!(parsed[0].view_count, 2);
    }

    #[test]
    fn legacy_content_items_become_fact_blocks() {
        let mut snapshots = json!([{
            "id": "live-nasa-data",
            "content": [{"icon": {}, "text": "2,000+ PHAs", "source": "CNEOS"}],
            "lastUpdated": "2024-10-01T10:00:00Z",
            "source": "static",
            "version": 3
        }]);
        upgrade_snapshots(&mut snapshots);
        assert_eq!(snapshots[0]["itemId"], "live-nasa-data");
        assert_eq!(snapshots[0]["content"][0]["kind"], "fact");
        assert!(snapshots[0]["content"][0].get("icon").is_none());
    }
}
