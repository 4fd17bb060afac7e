//! Response cache - TTL memoization of generated content
//!
//! Entries expire lazily: an expired entry found on lookup is removed and
//! counted as a miss. [`ResponseCache::sweep_expired`] removes the rest and
//! is driven from session maintenance.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which generator produced a cached value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Enemy,
    Quiz,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    /// Note identity (its title)
    pub note: String,
    /// Encounter level or quiz difficulty
    pub level: u32,
}

impl CacheKey {
    pub fn new(operation: Operation, note: impl Into<String>, level: u32) -> Self {
        Self {
            operation,
            note: note.into(),
            level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= self.ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hits over total lookups, 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct ResponseCache<V> {
    entries: AHashMap<CacheKey, CacheEntry<V>>,
    default_ttl: Duration,
    soft_capacity: usize,
    hits: u64,
    misses: u64,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(default_ttl: Duration, soft_capacity: usize) -> Self {
        Self {
            entries: AHashMap::new(),
            default_ttl,
            soft_capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`; expired entries are evicted and count as misses
    pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.hits += 1;
                debug!("Cache hit: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                debug!("Cache entry expired: {:?}", key);
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    pub fn insert_with_ttl(&mut self, key: CacheKey, value: V, ttl: Duration) {
        self.insert_at(key, value, ttl, Instant::now());
    }

    pub fn insert_at(&mut self, key: CacheKey, value: V, ttl: Duration, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created: now,
                ttl,
            },
        );

        if self.entries.len() > self.soft_capacity {
            warn!(
                "Response cache holds {} entries (soft capacity {})",
                self.entries.len(),
                self.soft_capacity
            );
        }
    }

    /// Drop every entry, or only those for one operation
    pub fn clear(&mut self, operation: Option<Operation>) {
        match operation {
            Some(op) => self.entries.retain(|k, _| k.operation != op),
            None => self.entries.clear(),
        }
    }

    /// Remove all expired entries, returning how many were dropped
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired_at(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Swept {} expired cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> ResponseCache<String> {
        ResponseCache::new(Duration::from_secs(600), 100)
    }

    #[test]
    fn test_hit_and_miss_counting() {
        let mut cache = cache();
        let key = CacheKey::new(Operation::Enemy, "Recipes", 3);

        assert_eq!(cache.get(&key), None);
        cache.insert(key.clone(), "Culinary Phantom".into());
        assert_eq!(cache.get(&key).as_deref(), Some("Culinary Phantom"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_level_and_operation_are_part_of_key() {
        let mut cache = cache();
        cache.insert(CacheKey::new(Operation::Enemy, "n", 1), "a".into());
        assert!(cache.get(&CacheKey::new(Operation::Enemy, "n", 2)).is_none());
        assert!(cache.get(&CacheKey::new(Operation::Quiz, "n", 1)).is_none());
    }

    #[test]
    fn test_expiry_is_lazy() {
        let mut cache = cache();
        let key = CacheKey::new(Operation::Quiz, "n", 1);
        let start = Instant::now();
        cache.insert_at(key.clone(), "q".into(), Duration::from_secs(10), start);

        assert!(cache.get_at(&key, start + Duration::from_secs(9)).is_some());
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(&key, start + Duration::from_secs(10)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_expired() {
        let mut cache = cache();
        let start = Instant::now();
        cache.insert_at(CacheKey::new(Operation::Enemy, "old", 1), "x".into(), Duration::from_secs(1), start);
        cache.insert_at(CacheKey::new(Operation::Enemy, "new", 1), "y".into(), Duration::from_secs(60), start);

        assert_eq!(cache.sweep_expired_at(start + Duration::from_secs(5)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_by_operation() {
        let mut cache = cache();
        cache.insert(CacheKey::new(Operation::Enemy, "a", 1), "e".into());
        cache.insert(CacheKey::new(Operation::Quiz, "a", 1), "q".into());

        cache.clear(Some(Operation::Enemy));
        assert_eq!(cache.len(), 1);
        cache.clear(None);
        assert!(cache.is_empty());
    }
}
