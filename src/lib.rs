// Library exports for tpcds-runner
// The binary and the integration tests both drive the benchmark through these modules

pub mod benchmark;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;

// Re-export commonly used types
pub use benchmark::{run_benchmark, AggregateMetric, QueryRunResult, RunReport};
pub use catalog::{select_catalog, CatalogTier, QueryCatalog};
pub use config::{Args, BenchmarkConfig};
pub use error::{BenchError, Result};
pub use query::{DataFusionSession, QuerySession};
