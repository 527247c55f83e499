//! Error types for chesync

use thiserror::Error;

/// Result type alias for chesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for chesync operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A git command failed or could not be spawned
    #[error("Git error: {0}")]
    Git(String),

    /// The remote workspace API rejected or failed a call
    #[error("Workspace API error: {0}")]
    Api(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
