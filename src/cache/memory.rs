//! In-process cache backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheBackend, CacheStore, ServerInfo};
use crate::error::Result;

/// [`CacheStore`] behind an async lock, shared by every clone.
#[derive(Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<CacheStore>>,
    started_at: Instant,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries))),
            started_at: Instant::now(),
        }
    }

    /// Shared store, for the expiry sweep task.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.store)
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn location(&self) -> String {
        "in-process".to_string()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        // Write lock: lookups move LRU order and counters.
        let value = self.store.write().await.get(key);
        debug!(key, hit = value.is_some(), "memory cache get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.store
            .write()
            .await
            .set(key, value.to_string(), Some(ttl))?;
        debug!(key, ttl_secs = ttl.as_secs(), "memory cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.store.write().await.delete(key))
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        let stats = self.store.read().await.stats();
        Ok(ServerInfo {
            version: format!("memory-{}", env!("CARGO_PKG_VERSION")),
            uptime_secs: self.started_at.elapsed().as_secs(),
            keyspace_hits: stats.keyspace_hits,
            keyspace_misses: stats.keyspace_misses,
            expired_keys: stats.expired_keys,
            evicted_keys: stats.evicted_keys,
            used_memory: stats.used_memory,
            used_memory_peak: stats.used_memory_peak,
            // The store is only reachable from inside this process.
            connected_clients: 1,
            total_commands_processed: stats.total_commands_processed,
        })
    }
}
