//! Data ingestion layer for access-stats.
//!
//! Responsible for retrieving access-log archives, extracting their log
//! member, folding lines into visit tallies and running the sequential
//! analysis pass.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use stats_core as core;
