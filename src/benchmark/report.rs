//! Run report: every raw result plus per-query summaries, exported as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use super::aggregator::{lower_median, AggregateMetric};
use super::result::QueryRunResult;
use crate::catalog::CatalogTier;
use crate::config::BenchmarkConfig;
use crate::error::Result;

fn epoch_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Timing spread of one query across iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub name: String,
    pub runs: usize,
    pub failures: usize,
    pub min_ms: Option<f64>,
    pub median_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

/// Summaries for every query name in `results`, failed runs included.
pub fn summarize(results: &[QueryRunResult]) -> Vec<QuerySummary> {
    let mut grouped: BTreeMap<&str, Vec<&QueryRunResult>> = BTreeMap::new();
    for result in results {
        grouped.entry(result.name.as_str()).or_default().push(result);
    }

    grouped
        .into_iter()
        .map(|(name, runs)| {
            let mut durations: Vec<f64> = runs
                .iter()
                .filter(|r| r.is_success())
                .filter_map(|r| r.duration_ms)
                .collect();
            // Sorts in place, so first/last are min/max
            let median_ms = lower_median(&mut durations);

            QuerySummary {
                name: name.to_string(),
                runs: runs.len(),
                failures: runs.len() - durations.len(),
                min_ms: durations.first().copied(),
                median_ms,
                max_ms: durations.last().copied(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub database: String,
    pub format: String,
    pub scale_in_gb: u32,
    pub tier: CatalogTier,
    pub iterations: u32,
    pub metric: Option<AggregateMetric>,
    pub summaries: Vec<QuerySummary>,
    pub results: Vec<QueryRunResult>,
}

impl RunReport {
    /// Build the report for a run that began at `started_at` and ends now.
    pub fn new(
        config: &BenchmarkConfig,
        tier: CatalogTier,
        started_at: SystemTime,
        results: Vec<QueryRunResult>,
        metric: Option<AggregateMetric>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at_ms: epoch_ms(started_at),
            finished_at_ms: epoch_ms(SystemTime::now()),
            database: config.database_name().to_string(),
            format: config.format.clone(),
            scale_in_gb: config.scale_in_gb,
            tier,
            iterations: config.iterations,
            metric,
            summaries: summarize(&results),
            results,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn file_name(&self) -> String {
        format!("run-{}.json", self.run_id)
    }

    /// Write the report into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?)?;
        Ok(path)
    }

    pub fn summary_table(&self) -> String {
        fn ms(value: Option<f64>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
        }

        let mut out = format!(
            "{:<8} {:>5} {:>7} {:>12} {:>12} {:>12}\n",
            "query", "runs", "failed", "min ms", "median ms", "max ms"
        );
        for s in &self.summaries {
            let _ = writeln!(
                out,
                "{:<8} {:>5} {:>7} {:>12} {:>12} {:>12}",
                s.name,
                s.runs,
                s.failures,
                ms(s.min_ms),
                ms(s.median_ms),
                ms(s.max_ms)
            );
        }
        match &self.metric {
            Some(metric) => {
                let _ = write!(out, "{}: {:.3}", metric.name, metric.value);
            }
            None => out.push_str("no result metric (failed or missing runs)"),
        }
        out
    }
}
