use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stats_core::settings::{RunConfig, Settings};
use stats_data::reader::{ArchiveSource, DirArchiveSource, HttpArchiveSource};
use stats_runtime::retry::RetryingSource;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Output bootstrap ───────────────────────────────────────────────────────────

/// Ensure the chart output directory exists, creating missing parents.
pub fn ensure_output_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
///
/// Unknown names pass through unchanged.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber writing to stderr.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Archive source ─────────────────────────────────────────────────────────────

/// Build the archive source selected by `settings`.
///
/// `--archive-dir` wins over `--base-url`. Either source is wrapped in a
/// [`RetryingSource`] using the validated retry count.
pub fn build_source(
    settings: &Settings,
    config: &RunConfig,
) -> anyhow::Result<Arc<dyn ArchiveSource>> {
    let source: Arc<dyn ArchiveSource> = match &settings.archive_dir {
        Some(dir) => Arc::new(RetryingSource::new(
            DirArchiveSource::new(dir),
            config.retries,
        )),
        None => {
            let http = HttpArchiveSource::new(
                &settings.base_url,
                Duration::from_secs(settings.timeout_secs),
            )?;
            Arc::new(RetryingSource::new(http, config.retries))
        }
    };
    Ok(source)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
