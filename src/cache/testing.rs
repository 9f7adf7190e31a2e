//! Test doubles for cache backends.

use std::time::Duration;

use async_trait::async_trait;

use super::{CacheBackend, ServerInfo};
use crate::error::{AppError, Result};

/// Backend whose every operation fails, standing in for an unreachable server.
pub(crate) struct UnreachableCache;

fn refused() -> AppError {
    AppError::Cache("connection refused".to_string())
}

#[async_trait]
impl CacheBackend for UnreachableCache {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    fn location(&self) -> String {
        "nowhere".to_string()
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(refused())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(refused())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(refused())
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        Err(refused())
    }
}
