//! Keyed cache with per-entry time-to-live.
//!
//! Expiry is lazy: an entry is only dropped when a `get` finds it stale.
//! There is no size bound.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    /// Negative TTLs count as zero. TTLs beyond chrono's range never expire.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_minutes: i64) {
        let ttl = Duration::try_minutes(ttl_minutes.max(0)).unwrap_or(Duration::MAX);
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: self.clock.now(),
                ttl,
            },
        );
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let entry = self.entries.get(key)?;
        if now - entry.stored_at > entry.ttl {
            self.entries.remove(key);
            tracing::trace!(key, "Cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    /// Entry count, stale entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;

    use super::*;

    fn cache() -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (TtlCache::new(clock.clone()), clock)
    }

    #[test]
    fn entry_expires_after_ttl() {
        let (mut cache, clock) = cache();
        cache.set("k", "v".to_string(), 1);

        clock.advance(Duration::seconds(61));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entry_alive_within_ttl() {
        let (mut cache, clock) = cache();
        cache.set("k", "v".to_string(), 1);

        clock.advance(Duration::seconds(60));
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn stale_entries_linger_until_read() {
        let (mut cache, clock) = cache();
        cache.set("a", "1".to_string(), 1);
        cache.set("b", "2".to_string(), 10);

        clock.advance(Duration::minutes(5));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_and_restarts_ttl() {
        let (mut cache, clock) = cache();
        cache.set("k", "old".to_string(), 1);
        clock.advance(Duration::seconds(50));
        cache.set("k", "new".to_string(), 1);
        clock.advance(Duration::seconds(50));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn oversized_ttl_does_not_overflow() {
        let (mut cache, clock) = cache();
        cache.set("forever", "v".to_string(), i64::MAX);
        cache.set("gone", "v".to_string(), -5);

        clock.advance(Duration::days(365 * 100));
        assert_eq!(cache.get("forever").as_deref(), Some("v"));
        assert_eq!(cache.get("gone"), None);
    }
}
