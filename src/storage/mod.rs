//! Persistence layer: platform paths and the stats file store.

pub mod paths;
pub mod stats_file;

pub use paths::AppPaths;
pub use stats_file::{JsonFileStore, StatsStore, StoreLock};
