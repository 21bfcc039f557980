//! Sequential analysis pipeline.
//!
//! For each archive id: fetch → decompress → iterate lines → ingest. Archive
//! failures are handled according to the configured [`ErrorPolicy`].

use std::time::Instant;

use chrono::Utc;
use stats_core::archives::ArchiveId;
use stats_core::error::Result;
use stats_core::models::VisitTallies;
use stats_core::settings::ErrorPolicy;
use tracing::{debug, info, warn};

use crate::aggregator::VisitAggregator;
use crate::reader::{load_archive_text, ArchiveSource};

// ── Public types ──────────────────────────────────────────────────────────────

/// Per-run configuration for the aggregation pass.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Platform labels in priority order.
    pub labels: Vec<String>,
    /// Month abbreviation whose days are tallied, e.g. `"Jan"`.
    pub target_month: String,
    pub error_policy: ErrorPolicy,
}

impl AnalysisOptions {
    /// A fresh aggregator configured from these options.
    pub fn aggregator(&self) -> VisitAggregator {
        VisitAggregator::new(&self.labels, self.target_month.clone())
    }
}

/// Metadata produced alongside the tallies.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when the run finished.
    pub generated_at: String,
    /// Number of archives the run was asked to process.
    pub archives_requested: usize,
    /// Number of archives ingested successfully.
    pub archives_processed: usize,
    /// Archive ids skipped under [`ErrorPolicy::Skip`], ascending.
    pub skipped: Vec<u32>,
    /// Total number of log lines ingested.
    pub lines_ingested: u64,
    /// Wall-clock seconds spent on the run.
    pub elapsed_seconds: f64,
}

/// The complete output of an analysis run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisResult {
    pub tallies: VisitTallies,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Assemble a result from a finished aggregator.
    pub fn from_aggregator(
        aggregator: VisitAggregator,
        archives_requested: usize,
        mut skipped: Vec<u32>,
        started: Instant,
    ) -> Self {
        skipped.sort_unstable();
        let lines_ingested = aggregator.lines_ingested();
        let metadata = AnalysisMetadata {
            generated_at: Utc::now().to_rfc3339(),
            archives_requested,
            archives_processed: archives_requested - skipped.len(),
            skipped,
            lines_ingested,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            processed = metadata.archives_processed,
            skipped = metadata.skipped.len(),
            lines = metadata.lines_ingested,
            "analysis finished in {:.2}s",
            metadata.elapsed_seconds
        );

        Self {
            tallies: aggregator.finalize(),
            metadata,
        }
    }

    /// Tallies and metadata as one JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Process one archive into a fresh, local aggregator.
pub fn analyze_archive(
    source: &dyn ArchiveSource,
    id: ArchiveId,
    options: &AnalysisOptions,
) -> Result<VisitAggregator> {
    let text = load_archive_text(source, id)?;
    let mut aggregator = options.aggregator();
    aggregator.ingest_text(&text);
    debug!(
        archive = id.0,
        lines = aggregator.lines_ingested(),
        "archive ingested"
    );
    Ok(aggregator)
}

/// Run the single linear pass over `ids`.
///
/// Under [`ErrorPolicy::Abort`] the first failing archive ends the run with
/// its error. Under [`ErrorPolicy::Skip`] the archive is logged, recorded in
/// [`AnalysisMetadata::skipped`], and the run continues.
pub fn analyze_archives(
    source: &dyn ArchiveSource,
    ids: &[ArchiveId],
    options: &AnalysisOptions,
) -> Result<AnalysisResult> {
    let started = Instant::now();
    info!(
        archives = ids.len(),
        source = %source.describe(),
        "starting sequential analysis"
    );

    let mut aggregator = options.aggregator();
    let mut skipped: Vec<u32> = Vec::new();

    for &id in ids {
        let text = match load_archive_text(source, id) {
            Ok(t) => t,
            Err(e) => match options.error_policy {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Skip => {
                    warn!(archive = id.0, error = %e, "skipping archive");
                    skipped.push(id.0);
                    continue;
                }
            },
        };

        let before = aggregator.lines_ingested();
        aggregator.ingest_text(&text);
        debug!(
            archive = id.0,
            lines = aggregator.lines_ingested() - before,
            "archive ingested"
        );
    }

    Ok(AnalysisResult::from_aggregator(
        aggregator,
        ids.len(),
        skipped,
        started,
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
