//! Error types for sentience-core.
//!
//! The timer and the insights view are total and never fail. Errors only
//! come from the edges: the local store, the config file and the remote
//! session service.

use std::path::PathBuf;
use thiserror::Error;

/// Tone generator errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("Audio output unavailable: {0}")]
    Unavailable(String),

    /// The device accepted the stream but playback failed
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),

    /// A value could not be serialized for storage
    #[error("Failed to encode value for '{key}': {message}")]
    Encode { key: String, message: String },
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
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Remote session service errors.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No bearer token configured
    #[error("Not authenticated with the session service")]
    NotAuthenticated,

    /// Base URL or path could not be joined into a request URL
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// Network or transport failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Session service returned HTTP {status}")]
    Status { status: u16 },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            RemoteError::Status {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}
