//! Cache Entry Module
//!
//! A single value held by the in-process store, with its expiry deadline and
//! the access tick used for LRU eviction.

use std::time::{Duration, Instant};

// == Cache Entry ==
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Deadline after which the entry is treated as absent, None = never
    pub expires_at: Option<Instant>,
    /// Store-wide access counter value at the last read or write
    pub last_access: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` from now, or never when `ttl` is None.
    pub fn new(value: String, ttl: Option<Duration>, tick: u64) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: ttl.map(|ttl| now + ttl),
            last_access: tick,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// Approximate footprint used for the memory counters.
    pub fn size_bytes(&self, key: &str) -> u64 {
        (key.len() + self.value.len()) as u64
    }
}
