//! Core error types for eldercare-core.
//!
//! Every fallible operation in the library returns [`CoreError`] or one of
//! the narrower enums below. None of them is fatal: callers report the
//! message to the user and keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for eldercare-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (missing or malformed form fields)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backend API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Record lookup failed
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
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

    /// Database is locked by another process
    #[error("Database is locked")]
    Locked,

    /// A persisted entry could not be decoded
    #[error("Corrupted entry '{key}': {reason}")]
    Corrupted { key: String, reason: String },

    /// The data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Time of day is not `HH:MM`
    #[error("Invalid time '{value}' for '{field}': expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    /// Date is not `YYYY-MM-DD`
    #[error("Invalid date '{value}' for '{field}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    /// Date range is reversed
    #[error("Invalid date range: {end} is before {start}")]
    InvalidRange { start: String, end: String },

    /// Import produced nothing usable
    #[error("No valid {0} found in import data")]
    EmptyImport(&'static str),
}

/// Backend API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request could not be sent or the connection failed
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("Erro {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Endpoint requires a bearer token and none is held
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Base URL or endpoint could not be joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
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

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
