//! Usage tracking.
//!
//! Durable, concurrency-safe counters of token and request usage, scoped by
//! identity, with automatic daily rollover.

pub mod stats;
pub mod tracker;

pub use stats::{Scope, UsageStats, today};
pub use tracker::{LockRegistry, UsageTracker};
