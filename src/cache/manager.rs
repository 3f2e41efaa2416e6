//! Cache manager holding the last successful response per key
//!
//! Provides a `CacheManager` that stores cloneable values with the instant they
//! were cached and the generation of the fetch that produced them. Expired
//! entries are still handed out through [`CacheManager::read`] (with
//! `is_expired = true`) so callers can show stale data while a refresh runs.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Clock;

/// A stored value and its bookkeeping
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// Generation of the fetch that produced the data
    generation: u64,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug, Clone, PartialEq)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the entry has outlived the TTL
    pub is_expired: bool,
}

/// Keeps whole-value cache entries in memory
///
/// An entry is valid iff `now - cached_at < ttl`. Entries are never updated in
/// place: every write replaces the whole entry.
pub struct CacheManager<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<T: Clone> CacheManager<T> {
    /// Creates an empty cache judging freshness with `clock`
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    /// Returns the current time according to the cache's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn is_fresh(&self, cached_at: DateTime<Utc>) -> bool {
        self.clock.now() - cached_at < self.ttl
    }

    /// Stores `data` under `key` unless a newer generation is already cached
    ///
    /// # Returns
    /// * `true` if the entry was written
    /// * `false` if the stored entry came from a later fetch and was kept
    pub fn write(&self, key: &str, data: T, generation: u64) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(key) {
            if existing.generation > generation {
                return false;
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                cached_at: self.clock.now(),
                generation,
            },
        );
        true
    }

    /// Reads an entry regardless of its age
    ///
    /// Returns `None` only if nothing has been cached under `key`.
    pub fn read(&self, key: &str) -> Option<CachedData<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;

        Some(CachedData {
            data: entry.data.clone(),
            cached_at: entry.cached_at,
            is_expired: !self.is_fresh(entry.cached_at),
        })
    }

    /// Reads an entry only if it is still within the TTL
    pub fn read_fresh(&self, key: &str) -> Option<T> {
        self.read(key)
            .filter(|cached| !cached.is_expired)
            .map(|cached| cached.data)
    }

    /// Returns true if there is no entry for `key` or it has expired
    pub fn is_stale(&self, key: &str) -> bool {
        self.read(key).map_or(true, |cached| cached.is_expired)
    }

    /// Discards the entry for `key`
    pub fn clear(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
