//! Error types for memcentral-migrate.

use thiserror::Error;

/// Errors that can occur during a migration run.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or CLI input.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cannot reach or drive the source Redis store.
    #[error("Source connection error: {0}")]
    SourceConnection(String),

    /// Source enumeration or fetch failed.
    #[error("Scan error: {0}")]
    Scan(String),

    /// Malformed source record content. Recorded per record, never fatal.
    #[error("Transform error for '{key}': {reason}")]
    Transform {
        /// Source key of the offending record.
        key: String,
        /// What was malformed.
        reason: String,
    },

    /// Destination API unreachable during setup.
    #[error("Destination connection error: {0}")]
    DestinationConnection(String),

    /// Destination rejected a single write with a non-2xx status.
    #[error("Destination rejected write for '{key}': HTTP {status}: {body}")]
    WriteRejected {
        /// Source key of the record being written.
        key: String,
        /// HTTP status code returned.
        status: u16,
        /// Response body, for manual replay.
        body: String,
    },

    /// HTTP transport error (connection refused, timeout, DNS failure).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Redis protocol error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;
