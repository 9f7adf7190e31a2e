//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

use super::{CacheBackend, ServerInfo};
use crate::error::{AppError, Result};

/// Redis-backed cache. Every key is stored as `<prefix>:<key>` so several
/// applications can share one server.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    url: String,
    prefix: String,
}

impl RedisCache {
    /// Opens a managed connection; fails if the server cannot be reached.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::Cache(format!("Invalid Redis URL '{}': {}", url, e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        info!(url, "Connected to Redis");
        Ok(Self {
            conn,
            url: url.to_string(),
            prefix: prefix.into(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.prefix, key)
    }
}

fn namespaced_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", prefix, key)
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn location(&self) -> String {
        self.url.clone()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.namespaced(key)).await.map_err(|e| {
            AppError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(self.namespaced(key), value, ttl_secs)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(self.namespaced(key)).await.map_err(|e| {
            AppError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        let mut conn = self.conn.clone();
        let raw: String = redis::cmd("INFO")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to read INFO: {}", e)))?;

        Ok(ServerInfo::from_redis_info(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_key() {
        assert_eq!(
            namespaced_key("property_listings", "all_properties"),
            "property_listings:all_properties"
        );
        assert_eq!(namespaced_key("", "all_properties"), "all_properties");
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = RedisCache::connect("not-a-redis-url", "prefix").await;
        assert!(matches!(result, Err(AppError::Cache(_))));
    }
}
