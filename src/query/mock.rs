//! Mock query session for testing
//!
//! Replays scripted durations and failures without a query engine, and keeps
//! track of every call the runner makes.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::session::QuerySession;
use crate::benchmark::QueryRunResult;
use crate::error::Result;

pub struct MockSession {
    /// Scripted durations per query, indexed by iteration - 1
    durations_ms: BTreeMap<String, Vec<f64>>,
    /// Default duration for queries without a script
    default_ms: f64,
    /// Queries that fail in every iteration, with their error message
    failures: BTreeMap<String, String>,
    settings: Vec<(String, String)>,
    database: Option<String>,
    executed: Vec<(String, u32)>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            durations_ms: BTreeMap::new(),
            default_ms: 100.0,
            failures: BTreeMap::new(),
            settings: Vec::new(),
            database: None,
            executed: Vec::new(),
        }
    }

    pub fn with_default_ms(mut self, ms: f64) -> Self {
        self.default_ms = ms;
        self
    }

    pub fn with_durations(mut self, name: &str, durations_ms: &[f64]) -> Self {
        self.durations_ms.insert(name.to_string(), durations_ms.to_vec());
        self
    }

    pub fn with_failure(mut self, name: &str, error: &str) -> Self {
        self.failures.insert(name.to_string(), error.to_string());
        self
    }

    pub fn settings(&self) -> &[(String, String)] {
        &self.settings
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// (query name, iteration) in execution order
    pub fn executed(&self) -> &[(String, u32)] {
        &self.executed
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuerySession for MockSession {
    async fn set_conf(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn use_database(&mut self, database: &str) -> Result<()> {
        self.database = Some(database.to_string());
        Ok(())
    }

    async fn run_query(&mut self, name: &str, iteration: u32, _sql: &str) -> QueryRunResult {
        self.executed.push((name.to_string(), iteration));

        if let Some(error) = self.failures.get(name) {
            return QueryRunResult::failure(name, iteration, error.clone());
        }

        let ms = self
            .durations_ms
            .get(name)
            .and_then(|d| d.get((iteration as usize).checked_sub(1)?))
            .copied()
            .unwrap_or(self.default_ms);
        QueryRunResult::with_duration_ms(name, iteration, ms)
    }
}
