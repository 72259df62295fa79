use async_trait::async_trait;

use crate::benchmark::QueryRunResult;
use crate::error::Result;

/// Handle to the query engine the benchmark drives.
///
/// The runner owns the session for the whole run and calls it strictly
/// sequentially. Execution failures are reported inside the returned
/// [`QueryRunResult`], never as an `Err`.
#[async_trait]
pub trait QuerySession: Send {
    /// Apply one engine setting before any query runs.
    async fn set_conf(&mut self, key: &str, value: &str) -> Result<()>;

    /// Make `database` the default for unqualified table names.
    async fn use_database(&mut self, database: &str) -> Result<()>;

    /// Execute and time `sql`.
    async fn run_query(&mut self, name: &str, iteration: u32, sql: &str) -> QueryRunResult;
}
