//! In-memory TTL cache for leaderboard and aggregate-stats payloads.
//!
//! Reads are served from here for `STATS_CACHE_TTL` seconds; every commit
//! that changes player stats calls [`invalidate_stats`] right after it lands.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::config::settings;

pub const STATS_KEY: &str = "stats:global";
pub const LEADERBOARD_PREFIX: &str = "leaderboard:";

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let hit = self.entries.get(key)?;
        if hit.expires_at > Instant::now() {
            return Some(hit.value.clone());
        }
        drop(hit);
        self.entries.remove(key);
        None
    }

    /// Insert `value`, evicting anything already expired.
    pub fn set(&self, key: K, value: V) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires_at > now);
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> TtlCache<String, V> {
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries.retain(|k, _| !k.starts_with(prefix));
    }
}

/// Global payload cache keyed by `stats:*` / `leaderboard:{sort}:{limit}:{offset}`.
pub static STATS: Lazy<TtlCache<String, Value>> =
    Lazy::new(|| TtlCache::new(Duration::from_secs(settings().stats_cache_ttl)));

pub fn leaderboard_key(sort: &str, limit: i64, offset: i64) -> String {
    format!("{LEADERBOARD_PREFIX}{sort}:{limit}:{offset}")
}

/// Drop every cached aggregate; call after any commit touching player stats.
pub fn invalidate_stats() {
    STATS.invalidate(&STATS_KEY.to_string());
    STATS.invalidate_prefix(LEADERBOARD_PREFIX);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let c: TtlCache<String, i32> = TtlCache::new(Duration::from_millis(0));
        c.set("a".into(), 1);
        assert_eq!(c.get(&"a".to_string()), None);
        assert!(c.is_empty());
    }

    #[test]
    fn set_evicts_expired_entries() {
        let c: TtlCache<String, i32> = TtlCache::new(Duration::from_millis(0));
        for i in 0..10 {
            c.set(format!("leaderboard:kills:10:{i}"), i);
        }
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn prefix_invalidation_keeps_other_keys() {
        let c: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        c.set("leaderboard:experience:10:0".into(), 1);
        c.set("leaderboard:kills:10:0".into(), 2);
        c.set("stats:global".into(), 3);
        c.invalidate_prefix("leaderboard:");
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&"stats:global".to_string()), Some(3));
    }
}
