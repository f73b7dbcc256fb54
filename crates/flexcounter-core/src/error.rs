//! Core error types for flexcounter-core.
//!
//! Rejected operations (`InvalidDuration`, `InvalidSaveState`) leave every
//! piece of state untouched. `CorruptSnapshot` is recovered where it is
//! detected and normally only shows up in logs.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for flexcounter-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A countdown target could not be accepted.
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    /// A session was saved while the timer read exactly zero.
    #[error("Cannot save a session while the timer reads 0:00:00")]
    InvalidSaveState,

    /// A persisted value could not be parsed.
    #[error("Corrupt snapshot value for '{key}': {value:?}")]
    CorruptSnapshot { key: String, value: String },

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// The data directory could not be resolved or created
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl CoreError {
    pub(crate) fn invalid_duration(input: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidDuration {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
