//! Error types for Che API operations

use thiserror::Error;

/// Result type for Che API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Che server
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or decoding error
    #[error("Che API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Che API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A required setting is missing
    #[error("Missing setting: {0}")]
    MissingEnv(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<Error> for chesync_core::Error {
    fn from(err: Error) -> Self {
        chesync_core::Error::Api(err.to_string())
    }
}
