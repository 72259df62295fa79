//! DataFusion-backed query session
//!
//! Tables are read in place from `<benchmark_path>/<database>/<table>`, either
//! a directory of files or a single `<table>.<ext>` file in the configured
//! format. Settings outside the `datafusion.` namespace have no DataFusion
//! equivalent and are kept as session properties only.

use async_trait::async_trait;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::datasource::file_format::options::ArrowReadOptions;
use datafusion::error::Result as DFResult;
use datafusion::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::session::QuerySession;
use crate::benchmark::QueryRunResult;
use crate::catalog::TPCDS_TABLES;
use crate::config::BenchmarkConfig;
use crate::error::{BenchError, Result};

const DATAFUSION_NAMESPACE: &str = "datafusion.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Parquet,
    /// Comma delimited with a header row
    Csv,
    /// Newline delimited JSON
    Json,
    /// Arrow IPC files
    Arrow,
}

impl DataFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Parquet => "parquet",
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
            DataFormat::Arrow => "arrow",
        }
    }
}

impl FromStr for DataFormat {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" => Ok(DataFormat::Parquet),
            "csv" => Ok(DataFormat::Csv),
            "json" | "ndjson" => Ok(DataFormat::Json),
            "arrow" | "ipc" => Ok(DataFormat::Arrow),
            other => Err(BenchError::InvalidArgument {
                option: "format",
                message: format!("'{}' is not readable by DataFusion (parquet, csv, json, arrow)", other),
            }),
        }
    }
}

pub struct DataFusionSession {
    ctx: SessionContext,
    data_root: PathBuf,
    format: DataFormat,
    properties: BTreeMap<String, String>,
    registered_tables: Vec<String>,
}

impl DataFusionSession {
    pub fn new(data_root: impl Into<PathBuf>, format: DataFormat) -> Self {
        info!("Initializing DataFusion session");

        let config = SessionConfig::new().with_information_schema(true);

        Self {
            ctx: SessionContext::new_with_config(config),
            data_root: data_root.into(),
            format,
            properties: BTreeMap::new(),
            registered_tables: Vec::new(),
        }
    }

    pub fn from_config(config: &BenchmarkConfig) -> Result<Self> {
        let format = config.format.parse()?;
        Ok(Self::new(&config.benchmark_path, format))
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Every setting passed to `set_conf`, applied or not.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn registered_tables(&self) -> &[String] {
        &self.registered_tables
    }

    async fn execute(&self, sql: &str) -> DFResult<Vec<RecordBatch>> {
        self.ctx.sql(sql).await?.collect().await
    }

    fn table_location(&self, database: &str, table: &str) -> Option<PathBuf> {
        let base = self.data_root.join(database);
        let dir = base.join(table);
        if dir.is_dir() {
            return Some(dir);
        }

        let file = base.join(format!("{}.{}", table, self.format.extension()));
        file.is_file().then_some(file)
    }

    async fn register_table(&self, table: &str, location: &Path) -> DFResult<()> {
        let path = location.to_string_lossy().into_owned();
        let extension = format!(".{}", self.format.extension());

        match self.format {
            DataFormat::Parquet => {
                self.ctx
                    .register_parquet(table, &path, ParquetReadOptions::default())
                    .await
            }
            DataFormat::Csv => {
                let options = CsvReadOptions::new().has_header(true).file_extension(&extension);
                self.ctx.register_csv(table, &path, options).await
            }
            DataFormat::Json => {
                let options = NdJsonReadOptions::default().file_extension(&extension);
                self.ctx.register_json(table, &path, options).await
            }
            DataFormat::Arrow => {
                self.ctx
                    .register_arrow(table, &path, ArrowReadOptions::default())
                    .await
            }
        }
    }
}

fn sql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl QuerySession for DataFusionSession {
    async fn set_conf(&mut self, key: &str, value: &str) -> Result<()> {
        if key.starts_with(DATAFUSION_NAMESPACE) {
            let statement = format!("SET {} = {}", key, sql_string_literal(value));
            self.execute(&statement)
                .await
                .map_err(|e| BenchError::Config(format!("failed to set {}: {}", key, e)))?;
            info!("Session setting {} = {}", key, value);
        } else {
            info!("Session property {} = {} (no DataFusion equivalent)", key, value);
        }

        self.properties.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn use_database(&mut self, database: &str) -> Result<()> {
        info!("Using database {} from {}", database, self.data_root.display());

        let create = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_identifier(database));
        self.execute(&create)
            .await
            .map_err(|e| BenchError::QueryExecution(format!("CREATE SCHEMA {}: {}", database, e)))?;
        self.set_conf("datafusion.catalog.default_schema", database).await?;

        self.registered_tables.clear();
        for table in TPCDS_TABLES {
            let Some(location) = self.table_location(database, table) else {
                warn!("Table {} not found under {}", table, self.data_root.join(database).display());
                continue;
            };

            debug!("Registering {} from {}", table, location.display());
            match self.register_table(table, &location).await {
                Ok(()) => self.registered_tables.push(table.to_string()),
                Err(e) => warn!("Failed to register {}: {}", table, e),
            }
        }

        info!(
            "Registered {}/{} TPC-DS tables in {}",
            self.registered_tables.len(),
            TPCDS_TABLES.len(),
            database
        );
        Ok(())
    }

    async fn run_query(&mut self, name: &str, iteration: u32, sql: &str) -> QueryRunResult {
        debug!("Executing {} (iteration {}): {}", name, iteration, sql.trim());

        let start = Instant::now();
        match self.execute(sql).await {
            Ok(batches) => {
                let elapsed = start.elapsed();
                let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
                info!(
                    "{} iteration {} finished in {:.3}s ({} rows)",
                    name,
                    iteration,
                    elapsed.as_secs_f64(),
                    rows
                );
                QueryRunResult::success(name, iteration, elapsed)
            }
            Err(e) => {
                error!("{} iteration {} failed: {}", name, iteration, e);
                QueryRunResult::failure(name, iteration, e.to_string())
            }
        }
    }
}
