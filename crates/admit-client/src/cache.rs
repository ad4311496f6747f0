//! Generic timestamp-expiring cache.
//!
//! Stores `{data, timestamp}` per key and treats an entry as absent once
//! `now - timestamp` exceeds the window. Backs the notification feed and the
//! homepage statistics cache.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    data: V,
    timestamp: Instant,
}

/// A TTL cache with eviction on access.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(
            key,
            CacheEntry {
                data: value,
                timestamp: Instant::now(),
            },
        );
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.timestamp) > self.ttl => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.data.clone()),
            None => None,
        }
    }

    pub fn remove(&self, key: &K) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_served_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(120));
        cache.insert("stats", 42);
        let written = Instant::now();
        let just_before = written + Duration::from_secs(119);
        assert_eq!(cache.get_at(&"stats", just_before), Some(42));
    }

    #[test]
    fn test_expired_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(120));
        cache.insert("stats", 42);
        let written = Instant::now();
        let just_after = written + Duration::from_secs(120) + Duration::from_millis(50);
        assert_eq!(cache.get_at(&"stats", just_after), None);
        // Expired entries are evicted, not resurrected.
        assert_eq!(cache.get(&"stats"), None);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.remove(&1);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some("b"));
        cache.clear();
        assert_eq!(cache.get(&2), None);
    }
}
