//! Core error types for repcount-core.
//!
//! Error taxonomy: invalid configuration is rejected at the store/setter
//! boundary, guard violations inside the session recover by no-op (see
//! `session`), peer unreachability degrades to the durable queue, and
//! persistence failures surface only to the caller of the store -- never
//! into the session state machine.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for repcount-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// History store errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Peer sync errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// A config field failed validation (all fields must be >= 1)
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// History-store-specific errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Failed to open the database
    #[error("Failed to open history store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        HistoryError::QueryFailed(err.to_string())
    }
}

/// Peer sync errors. Delivery failures are recovered by the durable
/// slot/outbox fallback and never propagate into the session.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Peer unreachable")]
    Unreachable,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
