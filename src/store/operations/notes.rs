use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_NOTE_LEN;
use crate::store::{keys, validate_item_id};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserNote {
    pub item_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Writes the note for an item. `created_at` survives rewrites.
    pub fn save_note(&self, item_id: &str, text: &str) -> Result<UserNote, StoreError> {
        validate_item_id(item_id)?;
        if text.len() > MAX_NOTE_LEN {
            return Err(StoreError::Validation(format!(
                "note exceeds {} bytes",
                MAX_NOTE_LEN
            )));
        }

        let _guard = self.lock_updates();
        let mut all: Vec<UserNote> = self.load(keys::USER_NOTES)?;
        let now = self.now();

        let note = match all.iter_mut().find(|n| n.item_id == item_id) {
            Some(existing) => {
                existing.text = text.to_string();
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let note = UserNote {
                    item_id: item_id.to_string(),
                    text: text.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                all.push(note.clone());
                note
            }
        };

        self.save(keys::USER_NOTES, &all)?;
        Ok(note)
    }

    pub fn get_note(&self, item_id: &str) -> Result<Option<UserNote>, StoreError> {
        let all: Vec<UserNote> = self.load(keys::USER_NOTES)?;
        Ok(all.into_iter().find(|n| n.item_id == item_id))
    }

    pub fn all_notes(&self) -> Result<Vec<UserNote>, StoreError> {
        self.load(keys::USER_NOTES)
    }
}
