//! Synthetic cache traffic for populating the metrics dashboard.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::CacheBackend;
use crate::error::Result;

pub const DEFAULT_ITERATIONS: usize = 50;

/// Operations issued per iteration: one set, two gets.
pub const OPERATIONS_PER_ITERATION: usize = 3;

const LOAD_KEY_TTL: Duration = Duration::from_secs(300);
const LOAD_KEY_SPACE: u32 = 20;
const RANDOM_KEY_SPACE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadTestReport {
    pub iterations: usize,
    pub operations_count: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Each iteration writes `load_test_key_<1..=20>`, reads it back, then
/// reads `random_key_<1..=100>`, which usually misses.
pub async fn generate_load<R>(
    cache: &dyn CacheBackend,
    iterations: usize,
    rng: &mut R,
) -> Result<LoadTestReport>
where
    R: Rng + Send + ?Sized,
{
    let mut report = LoadTestReport {
        iterations,
        operations_count: 0,
        hits: 0,
        misses: 0,
    };

    for i in 0..iterations {
        let key = format!("load_test_key_{}", rng.random_range(1..=LOAD_KEY_SPACE));
        let random_key = format!("random_key_{}", rng.random_range(1..=RANDOM_KEY_SPACE));

        cache.set(&key, &format!("test_value_{}", i), LOAD_KEY_TTL).await?;
        for lookup in [&key, &random_key] {
            match cache.get(lookup).await? {
                Some(_) => report.hits += 1,
                None => report.misses += 1,
            }
        }
        report.operations_count += OPERATIONS_PER_ITERATION;
    }

    debug!(?report, "Load generation finished");
    info!(
        operations = report.operations_count,
        "Generated cache load"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::testing::UnreachableCache;
    use crate::cache::MemoryCache;
    use crate::error::AppError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_default_run_counts_operations() {
        let cache = MemoryCache::new(1000);
        let mut rng = StdRng::seed_from_u64(7);

        let report = generate_load(&cache, DEFAULT_ITERATIONS, &mut rng)
            .await
            .unwrap();

        assert_eq!(report.operations_count, 150);
        assert_eq!(report.hits + report.misses, 100);
        // Every read-back of a freshly written key hits.
        assert!(report.hits >= DEFAULT_ITERATIONS as u64);
    }

    #[tokio::test]
    async fn test_load_moves_server_counters() {
        let cache = MemoryCache::new(1000);
        let mut rng = StdRng::seed_from_u64(11);

        let report = generate_load(&cache, 10, &mut rng).await.unwrap();
        let info = cache.server_info().await.unwrap();

        assert_eq!(info.keyspace_hits, report.hits);
        assert_eq!(info.keyspace_misses, report.misses);
    }

    #[tokio::test]
    async fn test_zero_iterations() {
        let cache = MemoryCache::new(10);
        let mut rng = StdRng::seed_from_u64(1);

        let report = generate_load(&cache, 0, &mut rng).await.unwrap();
        assert_eq!(report.operations_count, 0);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = generate_load(&UnreachableCache, 5, &mut rng).await;
        assert!(matches!(result, Err(AppError::Cache(_))));
    }
}
