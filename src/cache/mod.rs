//! Cache Module
//!
//! The cache store behind both caching tiers. Components receive a
//! [`CacheHandle`] and never know which backend is behind it:
//!
//! - [`RedisCache`] talks to a Redis server.
//! - [`MemoryCache`] keeps everything in-process with TTL expiry and LRU
//!   eviction, reporting Redis-style counters.

mod entry;
mod info;
mod memory;
mod redis_cache;
mod stats;
mod store;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use info::{human_bytes, human_uptime, ServerInfo};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 8 * 1024 * 1024; // 8 MB

/// Shared handle injected into every component that touches the cache.
pub type CacheHandle = Arc<dyn CacheBackend>;

// == Cache Backend ==
/// Key-value operations the service needs from a cache server.
///
/// Values are strings; typed access goes through [`CacheExt`].
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name, e.g. `redis` or `memory`.
    fn name(&self) -> &'static str;

    /// Where the backend lives, for status pages.
    fn location(&self) -> String;

    /// Returns the live value for `key`, or None when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Removes `key`. Returns whether it existed; removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Reads the server-side counters.
    async fn server_info(&self) -> Result<ServerInfo>;
}

/// JSON-typed helpers over any backend.
#[async_trait]
pub trait CacheExt: CacheBackend {
    /// Reads and deserializes a value. A value that no longer deserializes
    /// surfaces as `AppError::Serialization`.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores a value.
    async fn set_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }
}

impl<T: CacheBackend + ?Sized> CacheExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let cache: CacheHandle = Arc::new(MemoryCache::new(10));
        let sample = Sample {
            name: "listing".to_string(),
            count: 3,
        };

        cache
            .set_json("sample", &sample, Duration::from_secs(60))
            .await
            .unwrap();
        let restored: Option<Sample> = cache.get_json("sample").await.unwrap();

        assert_eq!(restored, Some(sample));
    }

    #[tokio::test]
    async fn test_get_json_corrupt_value() {
        let cache: CacheHandle = Arc::new(MemoryCache::new(10));
        cache
            .set("sample", "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Result<Option<Sample>> = cache.get_json("sample").await;
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
