//! Runtime orchestration layer for access-stats.
//!
//! Drives the aggregation pass over the archive list (sequentially or with
//! bounded parallelism) and provides retry behaviour for archive sources.

pub mod orchestrator;
pub mod retry;

pub use stats_core as core;
pub use stats_data as data;
