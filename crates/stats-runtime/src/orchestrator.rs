//! Batch orchestrator.
//!
//! Runs the aggregation pass over a list of archives either as the plain
//! sequential sweep or, with more than one job, as independent per-archive
//! passes whose local tallies are merged after each archive completes. No
//! tally is ever shared between tasks.

use std::sync::Arc;
use std::time::Instant;

use stats_core::archives::ArchiveId;
use stats_core::error::{Result, StatsError};
use stats_core::settings::ErrorPolicy;
use stats_data::aggregator::VisitAggregator;
use stats_data::analysis::{analyze_archive, analyze_archives, AnalysisOptions, AnalysisResult};
use stats_data::reader::ArchiveSource;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

// ── BatchOrchestrator ─────────────────────────────────────────────────────────

/// Drives one aggregation run over a fixed list of archives.
pub struct BatchOrchestrator {
    /// Maximum number of archives in flight at once.
    jobs: usize,
    options: AnalysisOptions,
}

impl BatchOrchestrator {
    /// Create a new orchestrator. `jobs` is clamped to at least 1.
    pub fn new(jobs: usize, options: AnalysisOptions) -> Self {
        Self {
            jobs: jobs.max(1),
            options,
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Process every archive in `ids` and return the merged result.
    ///
    /// Fetching and decompression are blocking, so all archive work runs on
    /// tokio's blocking pool.
    pub async fn run(
        &self,
        source: Arc<dyn ArchiveSource>,
        ids: Vec<ArchiveId>,
    ) -> Result<AnalysisResult> {
        if self.jobs == 1 {
            let options = self.options.clone();
            return tokio::task::spawn_blocking(move || {
                analyze_archives(source.as_ref(), &ids, &options)
            })
            .await
            .map_err(|e| StatsError::TaskJoin(e.to_string()))?;
        }

        self.run_parallel(source, ids).await
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn run_parallel(
        &self,
        source: Arc<dyn ArchiveSource>,
        ids: Vec<ArchiveId>,
    ) -> Result<AnalysisResult> {
        let started = Instant::now();
        tracing::info!(
            archives = ids.len(),
            jobs = self.jobs,
            source = %source.describe(),
            "starting parallel analysis"
        );

        let permits = Arc::new(Semaphore::new(self.jobs));
        let mut tasks: JoinSet<Result<(ArchiveId, Result<VisitAggregator>)>> = JoinSet::new();

        for &id in &ids {
            let permits = Arc::clone(&permits);
            let source = Arc::clone(&source);
            let options = self.options.clone();

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| StatsError::TaskJoin(e.to_string()))?;
                let outcome = tokio::task::spawn_blocking(move || {
                    analyze_archive(source.as_ref(), id, &options)
                })
                .await
                .map_err(|e| StatsError::TaskJoin(e.to_string()))?;
                Ok((id, outcome))
            });
        }

        let mut total = self.options.aggregator();
        let mut skipped: Vec<u32> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (id, outcome) = joined.map_err(|e| StatsError::TaskJoin(e.to_string()))??;
            match outcome {
                Ok(local) => total.merge(&local),
                Err(e) => match self.options.error_policy {
                    ErrorPolicy::Abort => {
                        tasks.abort_all();
                        return Err(e);
                    }
                    ErrorPolicy::Skip => {
                        tracing::warn!(archive = id.0, error = %e, "skipping archive");
                        skipped.push(id.0);
                    }
                },
            }
        }

        Ok(AnalysisResult::from_aggregator(
            total,
            ids.len(),
            skipped,
            started,
        ))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stats_core::models::DEFAULT_PLATFORM_LABELS;
    use stats_data::reader::{write_archive, DirArchiveSource};
    use tempfile::TempDir;

    fn options(policy: ErrorPolicy) -> AnalysisOptions {
        AnalysisOptions {
            labels: DEFAULT_PLATFORM_LABELS.iter().map(|s| s.to_string()).collect(),
            target_month: "Jan".to_string(),
            error_policy: policy,
        }
    }

    /// Stage archives 130101..=130110, each holding one line per hour 0..=day.
    fn staged() -> (TempDir, Vec<ArchiveId>) {
        let tmp = TempDir::new().expect("tempdir");
        let mut ids = Vec::new();
        for day in 1..=10u32 {
            let id = ArchiveId(130100 + day);
            let mut content = String::new();
            for hour in 0..=day {
                let agent = if hour % 2 == 0 { "Android" } else { "iPhone" };
                content.push_str(&format!(
                    "{} [{:02}/Jan/2013:{:02}:00:00 +0200]\n",
                    agent, day, hour
                ));
            }
            write_archive(
                &tmp.path().join(id.archive_name()),
                &id.member_name(),
                content.as_bytes(),
            )
            .expect("write archive");
            ids.push(id);
        }
        (tmp, ids)
    }

    fn dir_source(tmp: &TempDir) -> Arc<dyn ArchiveSource> {
        Arc::new(DirArchiveSource::new(tmp.path()))
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let (tmp, ids) = staged();

        let sequential = BatchOrchestrator::new(1, options(ErrorPolicy::Abort))
            .run(dir_source(&tmp), ids.clone())
            .await
            .unwrap();
        let parallel = BatchOrchestrator::new(4, options(ErrorPolicy::Abort))
            .run(dir_source(&tmp), ids)
            .await
            .unwrap();

        assert_eq!(parallel.tallies, sequential.tallies);
        assert_eq!(
            parallel.metadata.lines_ingested,
            sequential.metadata.lines_ingested
        );
        assert_eq!(parallel.metadata.archives_processed, 10);
        assert_eq!(parallel.tallies.days.get("10"), Some(11));
    }

    #[tokio::test]
    async fn test_parallel_skip_policy() {
        let (tmp, mut ids) = staged();
        ids.push(ArchiveId(130131));
        ids.push(ArchiveId(130130));

        let result = BatchOrchestrator::new(3, options(ErrorPolicy::Skip))
            .run(dir_source(&tmp), ids)
            .await
            .unwrap();

        assert_eq!(result.metadata.skipped, vec![130130, 130131]);
        assert_eq!(result.metadata.archives_processed, 10);
    }

    #[tokio::test]
    async fn test_parallel_abort_policy() {
        let (tmp, mut ids) = staged();
        ids.insert(0, ArchiveId(130199));

        let err = BatchOrchestrator::new(2, options(ErrorPolicy::Abort))
            .run(dir_source(&tmp), ids)
            .await
            .unwrap_err();

        assert!(matches!(err, StatsError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_sequential_abort_policy() {
        let (tmp, mut ids) = staged();
        ids.push(ArchiveId(130199));

        let err = BatchOrchestrator::new(1, options(ErrorPolicy::Abort))
            .run(dir_source(&tmp), ids)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("access_130199.zip"));
    }

    #[test]
    fn test_jobs_clamped() {
        assert_eq!(BatchOrchestrator::new(0, options(ErrorPolicy::Skip)).jobs(), 1);
    }
}
