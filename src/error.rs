//! Error types
//!
//! Store operations are total and never return errors. The types here
//! cover caller misuse of the query surface, metrics persistence, and
//! configuration.

use std::time::Duration;

use thiserror::Error;

/// Result type for the service binary
pub type Result<T> = std::result::Result<T, Error>;

/// Startup and serving failures of the service binary
///
/// Metrics persistence failures never reach this type; the aggregator logs
/// and absorbs them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Caller misuse of a query that needs a scoping key
///
/// Distinct from an empty result: an unknown session yields `Ok` with no
/// events, a missing session key yields this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("sessionKey is required for session-scoped queries")]
    MissingSessionKey,

    #[error("runId is required for run-scoped queries")]
    MissingRunId,
}

/// Failures loading or saving the metrics history file
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported metrics file version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("metrics I/O timed out after {0:?}")]
    Timeout(Duration),

    #[error("metrics I/O task failed: {0}")]
    Task(String),
}

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}
