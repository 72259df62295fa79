use tracing::info;

use super::aggregator::AggregateMetric;
use crate::error::Result;

/// Destination for the end-of-run metric.
pub trait MetricsReporter {
    fn report(&mut self, metric: &AggregateMetric) -> Result<()>;
}

/// Emits the metric as a structured log event.
#[derive(Debug, Default)]
pub struct LogReporter;

impl MetricsReporter for LogReporter {
    fn report(&mut self, metric: &AggregateMetric) -> Result<()> {
        info!(metric = %metric.name, value = metric.value, "Benchmark result");
        Ok(())
    }
}

impl MetricsReporter for Vec<AggregateMetric> {
    fn report(&mut self, metric: &AggregateMetric) -> Result<()> {
        self.push(metric.clone());
        Ok(())
    }
}
