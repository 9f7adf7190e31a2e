//! Background Tasks Module
//!
//! - Expiry sweep: drops expired entries from the in-process cache at the
//!   configured interval. Redis expires keys on its own.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
