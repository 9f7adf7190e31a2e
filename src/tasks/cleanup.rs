//! Expiry Sweep Task
//!
//! Periodically drops expired entries from the in-process cache so memory
//! held by keys nobody reads again is released.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns the sweep loop. Abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let cache = MemoryCache::new(10_000);
/// let sweep = spawn_cleanup_task(cache.store(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<RwLock<CacheStore>>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = every.as_millis() as u64, "Starting cache expiry sweep");

        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = store.write().await.cleanup_expired();
            if removed > 0 {
                info!(removed, "Expiry sweep removed entries");
            } else {
                debug!("Expiry sweep found nothing to remove");
            }
        }
    })
}
