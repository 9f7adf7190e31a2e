//! Request DTOs for the property API
//!
//! POST endpoints take no body; their tuning knobs come from the query string.

use serde::Deserialize;

use crate::metrics::DEFAULT_ITERATIONS;

/// Upper bound on iterations accepted by the load generator.
pub const MAX_LOAD_ITERATIONS: usize = 1_000;

/// Query string of `POST /properties/cache-load-test/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadTestParams {
    /// Iterations to run; three cache operations each
    #[serde(default)]
    pub iterations: Option<usize>,
}

impl LoadTestParams {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.iterations {
            Some(0) => Some("iterations must be at least 1".to_string()),
            Some(n) if n > MAX_LOAD_ITERATIONS => Some(format!(
                "iterations exceeds maximum of {}",
                MAX_LOAD_ITERATIONS
            )),
            _ => None,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS)
    }
}
