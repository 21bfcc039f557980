//! Report rendering layer for access-stats.
//!
//! Turns finished visit tallies into self-contained HTML chart pages and
//! writes them to disk.

pub mod charts;
pub mod document;

pub use stats_core as core;
