//! Core domain layer for access-stats.
//!
//! Holds the tally types, the log-line classifier, archive identifiers,
//! month helpers, CLI settings and the shared error type used by every other
//! crate in the workspace.

pub mod archives;
pub mod classifier;
pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;
