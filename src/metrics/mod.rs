//! Metrics Module
//!
//! Reads counters from the cache server, derives the hit ratio and a rating,
//! and can generate synthetic traffic to exercise both.

pub mod load;
pub mod reporter;

pub use load::{generate_load, LoadTestReport, DEFAULT_ITERATIONS};
pub use reporter::{
    hit_ratio, MetricsReporter, MetricsSnapshot, PerformanceRating, RatingThresholds,
};

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // The ratio stays within [0, 100] for any counters.
        #[test]
        fn prop_hit_ratio_bounded(hits in any::<u64>(), misses in any::<u64>()) {
            let ratio = hit_ratio(hits, misses);
            prop_assert!((0.0..=100.0).contains(&ratio));
        }

        // More hits against the same misses never lowers the rating.
        #[test]
        fn prop_rating_monotonic(hits in 0u64..10_000, extra in 0u64..10_000, misses in 0u64..10_000) {
            let thresholds = RatingThresholds::default();
            let rank = |r: PerformanceRating| match r {
                PerformanceRating::Poor => 0,
                PerformanceRating::Fair => 1,
                PerformanceRating::Good => 2,
                PerformanceRating::Excellent => 3,
            };
            let before = thresholds.rate(hit_ratio(hits, misses));
            let after = thresholds.rate(hit_ratio(hits + extra, misses));
            prop_assert!(rank(after) >= rank(before) || hits + misses == 0);
        }
    }
}
