use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Missing required option: --{0}")]
    MissingOption(&'static str),

    #[error("Invalid value for --{option}: {message}")]
    InvalidArgument {
        option: &'static str,
        message: String,
    },

    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query execution error: {0}")]
    QueryExecution(String),

    #[error("Inconsistent results for {query}: expected {expected} runs, found {found}")]
    InconsistentResults {
        query: String,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
