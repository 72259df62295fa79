//! Benchmark configuration
//!
//! Command-line options are parsed with clap into [`Args`] and then validated
//! into an immutable [`BenchmarkConfig`]. Extra engine settings can be loaded
//! from a TOML file passed with `--engine-config`.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

pub const DEFAULT_ITERATIONS: u32 = 3;
pub const DEFAULT_QUERY_OFFSET: u32 = 1;
pub const DEFAULT_QUERY_LIMIT: u32 = 100_000;

/// Settings every session receives before the first query runs.
pub const FIXED_SESSION_SETTINGS: &[(&str, &str)] = &[
    ("spark.sql.broadcastTimeout", "10000"),
    ("spark.sql.crossJoin.enabled", "true"),
];

/// A set of TPC-DS query numbers, e.g. from `--skippedQueries 7,14`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryNumbers(BTreeSet<u32>);

impl QueryNumbers {
    pub fn contains(&self, number: u32) -> bool {
        self.0.contains(&number)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u32> for QueryNumbers {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        QueryNumbers(iter.into_iter().collect())
    }
}

/// Parse a comma separated list of query numbers. Blank segments are ignored,
/// so an empty string yields an empty set.
pub fn parse_query_numbers(raw: &str) -> Result<QueryNumbers> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|source| BenchError::InvalidNumber {
                value: part.to_string(),
                source,
            })
        })
        .collect()
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "tpcds-runner",
    author,
    version,
    about = "Run the TPC-DS query suite and report the summed median latency",
    long_about = None
)]
pub struct Args {
    /// Storage format of the dataset (parquet, csv, json, arrow)
    #[arg(long)]
    pub format: String,

    /// Dataset scale in GB; selects the query tier and the database name
    #[arg(long = "scale-in-gb")]
    pub scale_in_gb: u32,

    /// Root directory holding the dataset and the results directory
    #[arg(long = "benchmark-path")]
    pub benchmark_path: PathBuf,

    /// Number of times the whole suite is run
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// First query number to run
    #[arg(long = "queryOffset", default_value_t = DEFAULT_QUERY_OFFSET)]
    pub query_offset: u32,

    /// Width of the query number range starting at the offset
    #[arg(long = "queryLimit", default_value_t = DEFAULT_QUERY_LIMIT)]
    pub query_limit: u32,

    /// Comma separated query numbers to skip
    #[arg(long = "skippedQueries", value_parser = parse_query_numbers)]
    pub skipped_queries: Option<QueryNumbers>,

    /// Comma separated query numbers to run exclusively
    #[arg(long = "cherryPickedQueries", value_parser = parse_query_numbers)]
    pub cherry_picked_queries: Option<QueryNumbers>,

    /// Database name, overriding tpcds_sf<scale>_<format>
    #[arg(long = "database")]
    pub database: Option<String>,

    /// TOML file with extra engine settings
    #[arg(long = "engine-config")]
    pub engine_config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,

    /// Do not write the run report under <benchmark-path>/results
    #[arg(long = "no-save-results", default_value_t = false)]
    pub no_save_results: bool,
}

/// Engine settings file.
///
/// ```toml
/// [settings]
/// "datafusion.execution.target_partitions" = 8
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Settings rendered as strings; TOML strings are taken verbatim.
    pub fn string_settings(&self) -> BTreeMap<String, String> {
        self.settings
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkConfig {
    pub format: String,
    pub scale_in_gb: u32,
    pub database_name: String,
    pub iterations: u32,
    pub benchmark_path: PathBuf,
    pub query_offset: u32,
    pub query_limit: u32,
    pub skipped_queries: QueryNumbers,
    pub cherry_picked_queries: QueryNumbers,
    pub save_results: bool,
    pub extra_settings: BTreeMap<String, String>,
}

impl BenchmarkConfig {
    pub fn builder() -> BenchmarkConfigBuilder {
        BenchmarkConfigBuilder::default()
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let mut builder = Self::builder()
            .format(args.format)
            .scale_in_gb(args.scale_in_gb)
            .benchmark_path(args.benchmark_path)
            .iterations(args.iterations)
            .query_offset(args.query_offset)
            .query_limit(args.query_limit)
            .skipped_queries(args.skipped_queries.unwrap_or_default())
            .cherry_picked_queries(args.cherry_picked_queries.unwrap_or_default())
            .save_results(!args.no_save_results);

        if let Some(database) = args.database {
            builder = builder.database_name_override(database);
        }

        if let Some(path) = args.engine_config {
            let engine_config = EngineConfig::from_file(&path).map_err(|e| {
                BenchError::Config(format!("failed to load {}: {}", path.display(), e))
            })?;
            builder = builder.extra_settings(engine_config.string_settings());
        }

        builder.build()
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn is_cherry_pick_mode(&self) -> bool {
        !self.cherry_picked_queries.is_empty()
    }

    /// Fixed session settings followed by the ones from the engine config.
    pub fn session_settings(&self) -> Vec<(String, String)> {
        FIXED_SESSION_SETTINGS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain(self.extra_settings.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    pub fn results_dir(&self) -> PathBuf {
        self.benchmark_path.join("results")
    }
}

#[derive(Debug, Clone, Default)]
pub struct BenchmarkConfigBuilder {
    format: Option<String>,
    scale_in_gb: Option<u32>,
    benchmark_path: Option<PathBuf>,
    database_name_override: Option<String>,
    iterations: Option<u32>,
    query_offset: Option<u32>,
    query_limit: Option<u32>,
    skipped_queries: QueryNumbers,
    cherry_picked_queries: QueryNumbers,
    save_results: Option<bool>,
    extra_settings: BTreeMap<String, String>,
}

impl BenchmarkConfigBuilder {
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn scale_in_gb(mut self, scale_in_gb: u32) -> Self {
        self.scale_in_gb = Some(scale_in_gb);
        self
    }

    pub fn benchmark_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.benchmark_path = Some(path.into());
        self
    }

    pub fn database_name_override(mut self, name: impl Into<String>) -> Self {
        self.database_name_override = Some(name.into());
        self
    }

    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn query_offset(mut self, offset: u32) -> Self {
        self.query_offset = Some(offset);
        self
    }

    pub fn query_limit(mut self, limit: u32) -> Self {
        self.query_limit = Some(limit);
        self
    }

    pub fn skipped_queries(mut self, queries: QueryNumbers) -> Self {
        self.skipped_queries = queries;
        self
    }

    pub fn cherry_picked_queries(mut self, queries: QueryNumbers) -> Self {
        self.cherry_picked_queries = queries;
        self
    }

    pub fn save_results(mut self, save: bool) -> Self {
        self.save_results = Some(save);
        self
    }

    pub fn extra_settings(mut self, settings: BTreeMap<String, String>) -> Self {
        self.extra_settings = settings;
        self
    }

    /// Database name the benchmark runs against: the override if one was
    /// given, else `tpcds_sf<scale>_<format>`. Fails while format is unset.
    pub fn database_name(&self) -> Result<String> {
        if let Some(name) = self.database_name_override.as_ref().filter(|n| !n.is_empty()) {
            return Ok(name.clone());
        }

        let format = self
            .format
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(BenchError::MissingOption("format"))?;
        let scale = self.scale_in_gb.ok_or(BenchError::MissingOption("scale-in-gb"))?;

        Ok(format!("tpcds_sf{}_{}", scale, format))
    }

    pub fn build(self) -> Result<BenchmarkConfig> {
        let format = self
            .format
            .clone()
            .filter(|f| !f.is_empty())
            .ok_or(BenchError::MissingOption("format"))?;
        let scale_in_gb = self.scale_in_gb.ok_or(BenchError::MissingOption("scale-in-gb"))?;
        let benchmark_path = self
            .benchmark_path
            .clone()
            .ok_or(BenchError::MissingOption("benchmark-path"))?;

        let iterations = self.iterations.unwrap_or(DEFAULT_ITERATIONS);
        if iterations == 0 {
            return Err(BenchError::InvalidArgument {
                option: "iterations",
                message: "must be at least 1".to_string(),
            });
        }

        let database_name = self.database_name()?;

        Ok(BenchmarkConfig {
            format,
            scale_in_gb,
            database_name,
            iterations,
            benchmark_path,
            query_offset: self.query_offset.unwrap_or(DEFAULT_QUERY_OFFSET),
            query_limit: self.query_limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            skipped_queries: self.skipped_queries,
            cherry_picked_queries: self.cherry_picked_queries,
            save_results: self.save_results.unwrap_or(true),
            extra_settings: self.extra_settings,
        })
    }
}
