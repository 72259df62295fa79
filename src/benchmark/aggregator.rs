//! Reduce per-iteration results to a single latency figure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::result::QueryRunResult;
use crate::error::{BenchError, Result};

pub const RESULT_METRIC_NAME: &str = "tpcds-result-seconds";

/// Results whose name lacks this prefix are diagnostics, not queries.
pub const QUERY_NAME_PREFIX: &str = "q";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetric {
    pub name: String,
    pub value: f64,
}

/// Element at index `len / 2` after an ascending sort. Even lengths pick one
/// of the two middle elements; they are never averaged.
pub fn lower_median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[values.len() / 2])
}

/// Sum of per-query median durations in seconds.
///
/// Returns `Ok(None)` when any query run failed or lacks a duration. A query
/// whose run count differs from `iterations` is an internal error.
pub fn aggregate(results: &[QueryRunResult], iterations: u32) -> Result<Option<AggregateMetric>> {
    let queries: Vec<&QueryRunResult> = results
        .iter()
        .filter(|r| r.name.starts_with(QUERY_NAME_PREFIX))
        .collect();

    let failures = queries.iter().filter(|r| !r.is_success()).count();
    if failures > 0 {
        warn!(
            "{} of {} query runs failed or have no duration, not reporting {}",
            failures,
            queries.len(),
            RESULT_METRIC_NAME
        );
        return Ok(None);
    }

    let mut durations: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for result in queries {
        // is_success() above guarantees the duration
        if let Some(ms) = result.duration_ms {
            durations.entry(result.name.as_str()).or_default().push(ms);
        }
    }

    let expected = iterations as usize;
    let mut total_seconds = 0.0;
    for (name, runs) in durations.iter_mut() {
        if runs.len() != expected {
            return Err(BenchError::InconsistentResults {
                query: name.to_string(),
                expected,
                found: runs.len(),
            });
        }

        let Some(median_ms) = lower_median(runs) else {
            continue;
        };
        debug!("{}: median {:.1} ms over {} runs", name, median_ms, expected);
        total_seconds += median_ms / 1000.0;
    }

    info!(
        "{} = {:.3} ({} queries)",
        RESULT_METRIC_NAME,
        total_seconds,
        durations.len()
    );

    Ok(Some(AggregateMetric {
        name: RESULT_METRIC_NAME.to_string(),
        value: total_seconds,
    }))
}
