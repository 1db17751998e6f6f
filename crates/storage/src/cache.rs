//! Bounded LRU cache over latest values.
//!
//! The cache is keyed by primary key and holds only the latest value
//! for that key — versioned and point-in-time reads bypass it entirely.
//! Capacity zero disables caching. Eviction is least-recently-used on
//! insert when full.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use serde_json::Value;

/// Default cache capacity when the caller does not choose one.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Configured capacity (0 = disabled).
    pub capacity: usize,
    /// Entries currently held.
    pub len: usize,
    /// Lookup hits.
    pub hits: u64,
    /// Lookup misses.
    pub misses: u64,
    /// Entries evicted to make room.
    pub evictions: u64,
}

/// LRU mapping from primary key to latest value.
#[derive(Debug)]
pub struct ValueCache {
    capacity: usize,
    map: FxHashMap<String, Value>,
    /// Recency order: front = least recently used.
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ValueCache {
    /// Create a cache with the given capacity. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        ValueCache {
            capacity,
            map: FxHashMap::default(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a key, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(value) = self.map.get(key) {
            let value = value.clone();
            self.touch(key);
            self.hits += 1;
            Some(value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Insert or replace a key's latest value, evicting the least
    /// recently used entry when full.
    pub fn set(&mut self, key: &str, value: Value) {
        if self.capacity == 0 {
            return;
        }
        if self.map.insert(key.to_string(), value).is_some() {
            self.touch(key);
            return;
        }
        if self.map.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
                self.evictions += 1;
            }
        }
        self.order.push_back(key.to_string());
    }

    /// True when the key is cached. Does not promote.
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Invalidate a key. Returns `true` iff an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.map.remove(key).is_some() {
            if let Some(pos) = self.order.iter().position(|k| k == key) {
                self.order.remove(pos);
            }
            true
        } else {
            false
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            len: self.map.len(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.to_string());
    }
}
