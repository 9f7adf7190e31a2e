//! Property Cache - a property listing service with two caching tiers
//!
//! Listings are served through a query cache of serialized results and a
//! response cache of whole rendered pages, both kept in Redis or in an
//! in-process store. Writes invalidate the query cache through explicit hooks.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod properties;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheBackend, CacheHandle, MemoryCache, RedisCache};
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_cleanup_task;
