// Storage keys. The names match the ones the browser client used so a
// dumped local store can be loaded as-is.

pub const USER_PROGRESS: &str = "meteorsim_user_progress";
pub const USER_PREFERENCES: &str = "meteorsim_user_preferences";
pub const CARD_ENGAGEMENT: &str = "meteorsim_card_engagement";
pub const STORED_CARDS: &str = "meteorsim_stored_cards";
pub const USER_NOTES: &str = "meteorsim_user_notes";

// Written by old clients, never read; removed on full purge.
pub const LEGACY_BOOKMARKS: &str = "meteorsim_bookmarks";

pub const SCHEMA_VERSION: &str = "_meta:schema_version";

/// Every user data key, in export order.
pub const USER_DATA_KEYS: [&str; 5] = [
    USER_PROGRESS,
    USER_PREFERENCES,
    CARD_ENGAGEMENT,
    STORED_CARDS,
    USER_NOTES,
];

pub fn all_keys() -> impl Iterator<Item = &'static str> {
    USER_DATA_KEYS
        .iter()
        .copied()
        .chain([LEGACY_BOOKMARKS, SCHEMA_VERSION])
}

pub fn content_cache_key(item_id: &str) -> String {
    format!("education_{}", item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keys_are_distinct() {
        let keys: Vec<&str> = all_keys().collect();
        let mut dedup = keys.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(keys.len(), dedup.len());
    }

    #[test]
    fn content_cache_key_is_prefixed() {
        assert_eq!(content_cache_key("asteroid-basics"), "education_asteroid-basics");
    }
}
