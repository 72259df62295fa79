use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of one query in one iteration.
///
/// Exactly one of `duration_ms` and `error` is set by the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRunResult {
    pub name: String,
    pub iteration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryRunResult {
    pub fn success(name: impl Into<String>, iteration: u32, duration: Duration) -> Self {
        Self::with_duration_ms(name, iteration, duration.as_secs_f64() * 1000.0)
    }

    pub fn with_duration_ms(name: impl Into<String>, iteration: u32, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            iteration,
            duration_ms: Some(duration_ms),
            error: None,
        }
    }

    pub fn failure(name: impl Into<String>, iteration: u32, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iteration,
            duration_ms: None,
            error: Some(error.into()),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().map_or(false, |e| !e.is_empty())
    }

    /// Usable for aggregation: a duration and no error message.
    pub fn is_success(&self) -> bool {
        !self.has_error() && self.duration_ms.is_some()
    }
}
