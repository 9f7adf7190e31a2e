//! Cache Store Module
//!
//! In-process key-value storage with TTL expiration, LRU eviction at capacity
//! and Redis-style server counters.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{CacheEntry, CacheStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{AppError, Result};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Server counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Monotonic access counter driving LRU order
    clock: u64,
    /// Sum of key and value sizes currently held
    used_memory: u64,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            clock: 0,
            used_memory: 0,
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous one and resetting its TTL.
    ///
    /// When a new key arrives at capacity, the least recently used entry is
    /// evicted first.
    pub fn set(&mut self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        self.stats.record_command();

        if key.is_empty() {
            return Err(AppError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(AppError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(AppError::ValueTooLarge {
                size: value.len(),
                limit: MAX_VALUE_SIZE,
            });
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }

        let tick = self.tick();
        let entry = CacheEntry::new(value, ttl, tick);
        self.used_memory += entry.size_bytes(key);
        if let Some(old) = self.entries.insert(key.to_string(), entry) {
            self.used_memory -= old.size_bytes(key);
        }

        self.refresh_footprint();
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// Expired entries are removed on access and count as misses.
    pub fn get(&mut self, key: &str) -> Option<String> {
        self.stats.record_command();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expired(1);
            self.stats.record_miss();
            self.refresh_footprint();
            return None;
        }

        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.last_access = tick;
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Delete ==
    /// Removes `key`, returning whether a live entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.stats.record_command();

        let existed = match self.remove_entry(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        };
        self.refresh_footprint();
        existed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expired(expired_keys.len());
        self.refresh_footprint();
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.remove_entry(&key);
            self.stats.record_eviction();
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.used_memory -= entry.size_bytes(key);
        Some(entry)
    }

    fn refresh_footprint(&mut self) {
        self.stats.set_footprint(self.used_memory);
    }
}
