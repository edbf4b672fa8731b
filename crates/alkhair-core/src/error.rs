//! Error types for alkhair-core

use thiserror::Error;

/// Result type alias using alkhair-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the remote data source while fetching a delta
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (DNS, connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Backend answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body could not be decoded into records
    #[error("Invalid remote payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Remote source was built with unusable settings
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),

    /// Failure requested through `MemoryRemote::fail_next`
    #[error("Injected remote failure: {0}")]
    Injected(String),
}

/// Errors raised by a local store while persisting or reading records
#[derive(Error, Debug)]
pub enum LocalStoreError {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Background write task did not run to completion
    #[error("Local write interrupted: {0}")]
    Interrupted(String),
}

/// Failure of a single sync pass.
///
/// Callers only need to know that the pass failed; the source is kept for
/// logging and display.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync failed while fetching remote delta: {0}")]
    Remote(#[from] RemoteError),

    #[error("Sync failed while merging into local store: {0}")]
    Local(#[from] LocalStoreError),
}

/// Errors that can occur in alkhair-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local store error
    #[error(transparent)]
    Local(#[from] LocalStoreError),

    /// Remote source error
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Sync pass error
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// libSQL error outside of a store operation (open, migrate)
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
