use clap::{Parser, ValueEnum};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::archives::{expand_ranges, ArchiveId, ArchiveRange, DEFAULT_ARCHIVE_RANGES};
use crate::error::{Result, StatsError};
use crate::time_utils::TargetMonth;

/// Default location of the daily access-log archives.
pub const DEFAULT_BASE_URL: &str = "http://firefire.cyber.org.il/logs";

// ── ErrorPolicy ───────────────────────────────────────────────────────────────

/// What to do when an archive cannot be fetched or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Stop the whole run on the first failing archive.
    #[default]
    Abort,
    /// Log a warning, record the archive as skipped and continue.
    Skip,
}

// ── Settings (CLI) ────────────────────────────────────────────────────────────

/// Platform and visit statistics from web-server access-log archives
#[derive(Parser, Debug, Clone)]
#[command(
    name = "access-stats",
    about = "Platform and visit statistics from web-server access-log archives",
    version
)]
pub struct Settings {
    /// Base URL the `access_{id}.zip` archives are fetched from
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Read archives from this directory instead of over HTTP
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Archive id range START-END (repeatable; defaults to Jan 1 - Mar 6 2013)
    #[arg(long = "range", value_name = "START-END")]
    pub ranges: Vec<String>,

    /// Month whose daily visits are charted
    #[arg(long, default_value = "Jan")]
    pub month: String,

    /// Platform labels in match priority order
    #[arg(long, value_delimiter = ',', default_value = "iPad,iPhone,Android,Windows")]
    pub platforms: Vec<String>,

    /// Directory the HTML charts are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Behaviour when an archive cannot be fetched or read
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    /// Number of archives processed concurrently (1-16)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=16))]
    pub jobs: u32,

    /// Extra fetch attempts per archive after a failure
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=10))]
    pub retries: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Validated, typed view of [`Settings`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub archives: Vec<ArchiveId>,
    pub month: TargetMonth,
    pub platforms: Vec<String>,
    pub error_policy: ErrorPolicy,
    pub jobs: usize,
    pub retries: u32,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` flag.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Resolve the month, archive list and platform labels.
    pub fn validate(&self) -> Result<RunConfig> {
        let month = TargetMonth::parse(&self.month)?;

        let ranges: Vec<ArchiveRange> = if self.ranges.is_empty() {
            DEFAULT_ARCHIVE_RANGES.to_vec()
        } else {
            self.ranges
                .iter()
                .map(|r| r.parse())
                .collect::<Result<Vec<_>>>()?
        };
        let archives = expand_ranges(&ranges);

        let platforms: Vec<String> = self
            .platforms
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if platforms.is_empty() {
            return Err(StatsError::Config(
                "at least one platform label is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &platforms {
            if !seen.insert(label.to_lowercase()) {
                return Err(StatsError::Config(format!(
                    "duplicate platform label: {}",
                    label
                )));
            }
        }

        Ok(RunConfig {
            archives,
            month,
            platforms,
            error_policy: self.on_error,
            jobs: self.jobs as usize,
            retries: self.retries,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
