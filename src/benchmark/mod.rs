//! Benchmark execution: run the catalog, aggregate, report.

mod aggregator;
mod metrics;
mod report;
mod result;
mod runner;

pub use aggregator::{aggregate, lower_median, AggregateMetric, QUERY_NAME_PREFIX, RESULT_METRIC_NAME};
pub use metrics::{LogReporter, MetricsReporter};
pub use report::{summarize, QuerySummary, RunReport};
pub use result::QueryRunResult;
pub use runner::BenchmarkRunner;

use std::time::SystemTime;
use tracing::info;

use crate::catalog::select_catalog;
use crate::config::BenchmarkConfig;
use crate::error::Result;
use crate::query::QuerySession;

/// Run the whole benchmark against `session`.
///
/// The metric goes to `reporter` only when every query run succeeded. The
/// report is written under `<benchmark_path>/results` unless saving is
/// disabled in the config.
pub async fn run_benchmark<S, R>(
    config: &BenchmarkConfig,
    session: &mut S,
    reporter: &mut R,
) -> Result<RunReport>
where
    S: QuerySession + ?Sized,
    R: MetricsReporter + ?Sized,
{
    let catalog = select_catalog(config.scale_in_gb);
    info!(
        "Benchmarking {} with {} ({} queries, {} iterations)",
        config.database_name(),
        catalog.tier(),
        catalog.len(),
        config.iterations
    );

    let started_at = SystemTime::now();
    let runner = BenchmarkRunner::new(config, &catalog);
    runner.prepare(session).await?;
    let results = runner.run(session).await;

    let metric = aggregate(&results, config.iterations)?;
    if let Some(metric) = &metric {
        reporter.report(metric)?;
    }

    let report = RunReport::new(config, catalog.tier(), started_at, results, metric);
    info!("Run {} summary:\n{}", report.run_id, report.summary_table());

    if config.save_results {
        let path = report.write_to_dir(&config.results_dir())?;
        info!("Run report written to {}", path.display());
    }

    Ok(report)
}
