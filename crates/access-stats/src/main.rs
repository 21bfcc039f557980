mod bootstrap;

use anyhow::Result;
use stats_core::settings::Settings;
use stats_data::analysis::AnalysisOptions;
use stats_report::charts::write_reports;
use stats_runtime::orchestrator::BatchOrchestrator;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("access-stats v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.validate()?;
    tracing::info!(
        "Month: {}, Platforms: {}, Archives: {}, Jobs: {}, On error: {:?}",
        config.month.abbreviation,
        config.platforms.join(","),
        config.archives.len(),
        config.jobs,
        config.error_policy
    );

    bootstrap::ensure_output_dir(&settings.output_dir)?;

    // The HTTP source wraps a blocking client, which must be built outside
    // the async runtime.
    let source = bootstrap::build_source(&settings, &config)?;

    let options = AnalysisOptions {
        labels: config.platforms.clone(),
        target_month: config.month.abbreviation.clone(),
        error_policy: config.error_policy,
    };
    let orchestrator = BatchOrchestrator::new(config.jobs, options);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(config.jobs)
        .enable_all()
        .build()?;
    let result = runtime.block_on(orchestrator.run(source, config.archives.clone()))?;

    tracing::debug!("Run summary: {}", result.to_json()?);

    if !result.metadata.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} archive(s): {:?}",
            result.metadata.skipped.len(),
            result.metadata.skipped
        );
    }

    // One line per platform, in priority order.
    for (platform, pct) in result.tallies.platforms.percentages().iter() {
        println!("{}: {:?}%", platform, pct);
    }

    let written = write_reports(&settings.output_dir, &config.month, &result.tallies)?;
    for path in &written {
        tracing::info!("Wrote {}", path.display());
    }

    Ok(())
}
