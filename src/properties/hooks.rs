//! Post-write hooks run by [`PropertyWriter`](super::PropertyWriter).

use async_trait::async_trait;
use tracing::{info, warn};

use super::invalidation::invalidate_property_cache;
use super::model::Property;
use crate::cache::CacheHandle;
use crate::error::{AppError, Result};

/// A committed change to the property table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    Created(Property),
    Updated(Property),
    Deleted(Property),
}

impl WriteEvent {
    pub fn action(&self) -> &'static str {
        match self {
            WriteEvent::Created(_) => "created",
            WriteEvent::Updated(_) => "updated",
            WriteEvent::Deleted(_) => "deleted",
        }
    }

    pub fn property(&self) -> &Property {
        match self {
            WriteEvent::Created(p) | WriteEvent::Updated(p) | WriteEvent::Deleted(p) => p,
        }
    }
}

/// Runs after a write has been committed and before the write call returns.
#[async_trait]
pub trait WriteHook: Send + Sync {
    async fn after_write(&self, event: &WriteEvent) -> Result<()>;
}

// == Cache Invalidation Hook ==
/// Drops the query-cache entries a write may have made stale.
pub struct CacheInvalidationHook {
    cache: CacheHandle,
    fail_open: bool,
}

impl CacheInvalidationHook {
    /// With `fail_open`, invalidation errors are logged and swallowed;
    /// otherwise they fail the write call.
    pub fn new(cache: CacheHandle, fail_open: bool) -> Self {
        Self { cache, fail_open }
    }
}

#[async_trait]
impl WriteHook for CacheInvalidationHook {
    async fn after_write(&self, event: &WriteEvent) -> Result<()> {
        let property = event.property();
        info!(
            action = event.action(),
            id = property.id,
            "Invalidating property cache after write"
        );

        let report = invalidate_property_cache(self.cache.as_ref()).await;
        if report.success {
            return Ok(());
        }

        let message = report.errors.join("; ");
        if self.fail_open {
            warn!(errors = %message, "Cache invalidation failed, continuing");
            Ok(())
        } else {
            Err(AppError::Cache(message))
        }
    }
}

// == Change Log Hook ==
/// Writes one log line per change.
pub struct ChangeLogHook;

#[async_trait]
impl WriteHook for ChangeLogHook {
    async fn after_write(&self, event: &WriteEvent) -> Result<()> {
        let property = event.property();
        info!(
            action = event.action(),
            id = property.id,
            title = %property.title,
            location = %property.location,
            price = %property.price.formatted(),
            "Property changed"
        );
        Ok(())
    }
}
