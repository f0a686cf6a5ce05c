use serde::{Deserialize, Serialize};

use crate::store::{keys, validate_item_id};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Favorited item ids, unique, in the order they were added.
    pub favorite_item_ids: Vec<String>,
    pub difficulty_filter: DifficultyFilter,
    pub auto_update: bool,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            favorite_item_ids: Vec::new(),
            difficulty_filter: DifficultyFilter::All,
            auto_update: true,
            notifications: true,
        }
    }
}

impl Preferences {
    pub fn is_favorite(&self, item_id: &str) -> bool {
        self.favorite_item_ids.iter().any(|id| id == item_id)
    }

    pub(crate) fn dedup_favorites(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.favorite_item_ids.retain(|id| seen.insert(id.clone()));
    }
}

/// Fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(default)]
    pub favorite_item_ids: Option<Vec<String>>,
    #[serde(default)]
    pub difficulty_filter: Option<DifficultyFilter>,
    #[serde(default)]
    pub auto_update: Option<bool>,
    #[serde(default)]
    pub notifications: Option<bool>,
}

impl Store {
    pub fn get_preferences(&self) -> Result<Preferences, StoreError> {
        self.load(keys::USER_PREFERENCES)
    }

    /// Shallow-merges `patch` onto the stored (or default) preferences and
    /// persists the full object.
    pub fn save_preferences(&self, patch: &PreferencesPatch) -> Result<Preferences, StoreError> {
        let _guard = self.lock_updates();
        let mut prefs = self.get_preferences()?;

        if let Some(ids) = &patch.favorite_item_ids {
            prefs.favorite_item_ids = ids.clone();
            prefs.dedup_favorites();
        }
        if let Some(filter) = patch.difficulty_filter {
            prefs.difficulty_filter = filter;
        }
        if let Some(auto_update) = patch.auto_update {
            prefs.auto_update = auto_update;
        }
        if let Some(notifications) = patch.notifications {
            prefs.notifications = notifications;
        }

        self.save(keys::USER_PREFERENCES, &prefs)?;
        Ok(prefs)
    }

    /// Adds an item to favorites. Adding an existing favorite is a no-op.
    pub fn add_favorite(&self, item_id: &str) -> Result<Preferences, StoreError> {
        validate_item_id(item_id)?;
        let _guard = self.lock_updates();
        let mut prefs = self.get_preferences()?;
        if !prefs.is_favorite(item_id) {
            prefs.favorite_item_ids.push(item_id.to_string());
            self.save(keys::USER_PREFERENCES, &prefs)?;
        }
        Ok(prefs)
    }

    /// Removes an item from favorites. Removing a non-favorite is a no-op.
    pub fn remove_favorite(&self, item_id: &str) -> Result<Preferences, StoreError> {
        let _guard = self.lock_updates();
        let mut prefs = self.get_preferences()?;
        let before = prefs.favorite_item_ids.len();
        prefs.favorite_item_ids.retain(|id| id != item_id);
        if prefs.favorite_item_ids.len() != before {
            self.save(keys::USER_PREFERENCES, &prefs)?;
        }
        Ok(prefs)
    }

    pub fn is_favorite(&self, item_id: &str) -> Result<bool, StoreError> {
        Ok(self.get_preferences()?.is_favorite(item_id))
    }
}
