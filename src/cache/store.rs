//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order tracking
//! and lazy TTL expiration.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};
use crate::clock::current_timestamp_ms;

// == Cache Store ==
/// Bounded cache storage with oldest-inserted eviction and per-entry TTL.
///
/// Expired entries are only removed when a `get` observes them; there is
/// no background sweep.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order tracker
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    default_ttl_ms: u64,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_size` - Maximum number of entries; 0 disables storage entirely
    /// * `default_ttl_ms` - TTL in milliseconds for entries without explicit TTL
    pub fn new(max_size: usize, default_ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(max_size),
            max_size,
            default_ttl_ms,
        }
    }

    // == Set ==
    /// Stores a value under `key` with an optional TTL override in milliseconds.
    ///
    /// If the key already exists, the value and TTL are replaced but the key
    /// keeps its original insertion position. If the key is new and the cache
    /// is full, the oldest inserted entry is evicted first.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_ms: Option<u64>) {
        self.set_at(key, value, ttl_ms, current_timestamp_ms());
    }

    /// Same as [`CacheStore::set`] with an explicit storage timestamp.
    pub fn set_at(&mut self, key: impl Into<String>, value: V, ttl_ms: Option<u64>, now: u64) {
        if self.max_size == 0 {
            return;
        }

        let key = key.into();
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.order.pop_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(key = %evicted_key, "Cache evicted oldest entry");
            }
        }

        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        self.entries
            .insert(key.clone(), CacheEntry::stored_at(value, ttl, now));
        self.order.record(&key);
        self.stats.set_size(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is absent or expired; expired entries are
    /// removed. A hit does not change eviction order.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, current_timestamp_ms())
    }

    /// Same as [`CacheStore::get`] with an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now: u64) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.stats.set_size(self.entries.len());
            self.stats.record_miss();
            debug!(key, "Cache entry expired");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Clear ==
    /// Removes all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_size(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
