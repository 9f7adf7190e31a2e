//! Cache Statistics Module
//!
//! Server-side counters of the in-process store, mirroring the fields Redis
//! reports through `INFO`.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub keyspace_hits: u64,
    /// Lookups that found nothing or an expired entry
    pub keyspace_misses: u64,
    /// Entries dropped by the LRU policy
    pub evicted_keys: u64,
    /// Entries dropped because their TTL elapsed
    pub expired_keys: u64,
    /// Every get, set and delete served
    pub total_commands_processed: u64,
    /// Current footprint of keys and values in bytes
    pub used_memory: u64,
    /// Highest footprint observed
    pub used_memory_peak: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.keyspace_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.keyspace_misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evicted_keys += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired_keys += count as u64;
    }

    pub fn record_command(&mut self) {
        self.total_commands_processed += 1;
    }

    // == Footprint ==
    /// Updates the memory figure, keeping the peak.
    pub fn set_footprint(&mut self, used_memory: u64) {
        self.used_memory = used_memory;
        self.used_memory_peak = self.used_memory_peak.max(used_memory);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.keyspace_hits, 0);
        assert_eq!(stats.keyspace_misses, 0);
        assert_eq!(stats.evicted_keys, 0);
        assert_eq!(stats.used_memory_peak, 0);
    }

    #[test]
    fn test_record_lookups_and_evictions() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        assert_eq!(stats.keyspace_hits, 2);
        assert_eq!(stats.keyspace_misses, 1);
        assert_eq!(stats.evicted_keys, 1);
    }

    #[test]
    fn test_footprint_keeps_peak() {
        let mut stats = CacheStats::new();
        stats.set_footprint(300);
        stats.set_footprint(100);
        assert_eq!(stats.used_memory, 100);
        assert_eq!(stats.used_memory_peak, 300);
    }

    #[test]
    fn test_record_expired_accumulates() {
        let mut stats = CacheStats::new();
        stats.record_expired(2);
        stats.record_expired(3);
        assert_eq!(stats.expired_keys, 5);
    }
}
