use tracing::{debug, info};

use super::result::QueryRunResult;
use crate::catalog::QueryCatalog;
use crate::config::BenchmarkConfig;
use crate::error::Result;
use crate::query::{QuerySelector, QuerySession, Selection};

/// Drives the catalog through a session, one query at a time.
pub struct BenchmarkRunner<'a> {
    config: &'a BenchmarkConfig,
    catalog: &'a QueryCatalog,
    selector: QuerySelector,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(config: &'a BenchmarkConfig, catalog: &'a QueryCatalog) -> Self {
        Self {
            config,
            catalog,
            selector: QuerySelector::new(config),
        }
    }

    /// Apply the session settings and select the benchmark database.
    pub async fn prepare<S>(&self, session: &mut S) -> Result<()>
    where
        S: QuerySession + ?Sized,
    {
        for (key, value) in self.config.session_settings() {
            session.set_conf(&key, &value).await?;
        }
        session.use_database(self.config.database_name()).await
    }

    /// Run every iteration to completion. Query failures are recorded in the
    /// returned results and do not stop the run.
    pub async fn run<S>(&self, session: &mut S) -> Vec<QueryRunResult>
    where
        S: QuerySession + ?Sized,
    {
        let mut results = Vec::new();

        for iteration in 1..=self.config.iterations {
            info!("Starting iteration {}/{}", iteration, self.config.iterations);

            for (name, sql) in self.catalog.iter() {
                if let Selection::Skip(reason) = self.selector.select(name) {
                    debug!("Skipping {} in iteration {} ({:?})", name, iteration, reason);
                    continue;
                }

                info!("Running {} (iteration {})", name, iteration);
                results.push(session.run_query(name, iteration, sql).await);
            }
        }

        results
    }
}
