//! `ValidationCache` — ambient result cache
//!
//! Grounded on the call sites in the teacher's `consensus/validator.rs`
//! (`get_cached_block_validation`, `cache_transaction_validation`,
//! `is_cache_valid`) even though the teacher's own `cache.rs` wasn't
//! retrieved into this pack. An LRU-bounded map of `key -> (value, ttl)`
//! behind a `std::sync::Mutex`, so it can be reached from the synchronous
//! admission and block-production paths; wired into
//! [`crate::consensus::admission`] to memoise per-transaction signature
//! verification, which is pure given the same signed bytes (§4.3) but
//! otherwise repeated every time an overlapping mempool is re-admitted.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    inserted_at: Instant,
}

pub struct CacheConfig {
    pub capacity: NonZeroUsize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(4096).unwrap(),
            ttl: Duration::from_secs(60),
        }
    }
}

/// A small TTL-bounded LRU cache, safe to share behind an `Arc`.
pub struct ValidationCache<K, V> {
    config: CacheConfig,
    inner: Mutex<LruCache<K, CacheEntry<V>>>,
}

impl<K, V> ValidationCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        let inner = Mutex::new(LruCache::new(config.capacity));
        Self { config, inner }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock().unwrap();
        let entry = guard.get(key)?;
        if entry.inserted_at.elapsed() > self.config.ttl {
            guard.pop(key);
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let mut guard = self.inner.lock().unwrap();
        guard.put(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }
}

impl<K, V> Default for ValidationCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_retrieves() {
        let cache: ValidationCache<u64, bool> = ValidationCache::default();
        cache.insert(1, true);
        assert_eq!(cache.get(&1), Some(true));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn expires_past_ttl() {
        let cache: ValidationCache<u64, bool> = ValidationCache::new(CacheConfig {
            capacity: NonZeroUsize::new(8).unwrap(),
            ttl: Duration::from_millis(1),
        });
        cache.insert(1, true);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&1), None);
    }
}
