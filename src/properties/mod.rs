//! Properties Module
//!
//! The property table, its single write path with post-write hooks, and the
//! cached read side.

pub mod hooks;
pub mod invalidation;
pub mod keys;
pub mod model;
pub mod query;
pub mod repository;
pub mod seed;
pub mod writer;


pub use hooks::{CacheInvalidationHook, ChangeLogHook, WriteEvent, WriteHook};
pub use invalidation::{invalidate_property_cache, InvalidationReport};
pub use keys::CacheTimeouts;
pub use model::{NewProperty, Price, Property, PropertyChanges};
pub use query::{CacheInfo, CachedQueryResult, QueryService, WarmReport};
pub use repository::{connect_pool, PropertyRepository};
pub use seed::seed_sample_properties;
pub use writer::PropertyWriter;
