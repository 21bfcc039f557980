use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used where the underlying transport/archive crate should not
/// leak into the core crate's public API.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors produced by access-stats.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be retrieved from its source.
    #[error("Failed to fetch archive {archive}: {source}")]
    Fetch {
        archive: u32,
        #[source]
        source: BoxError,
    },

    /// The archive server answered with a non-success status.
    #[error("Archive {archive} request returned HTTP {status}")]
    HttpStatus { archive: u32, status: u16 },

    /// The archive bytes are not a readable zip file.
    #[error("Malformed archive {archive}: {source}")]
    MalformedArchive {
        archive: u32,
        #[source]
        source: BoxError,
    },

    /// The archive does not contain the expected log member.
    #[error("Archive {archive} has no member named {member}")]
    MissingMember { archive: u32, member: String },

    /// A month abbreviation could not be resolved.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// An archive range argument could not be parsed.
    #[error("Invalid archive range: {0}")]
    InvalidArchiveRange(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A chart payload could not be serialized.
    #[error("Failed to serialize chart data: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// A background worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    TaskJoin(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the access-stats crates.
pub type Result<T> = std::result::Result<T, StatsError>;
