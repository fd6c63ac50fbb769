//! Unified error types for Perch

use thiserror::Error;

/// Unified error type for all Perch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed user input, caught before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend rejected a call; code/message already extracted from the
    /// error body so the raw transport error is never shown
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// Transport-level failure (connect, TLS, timeout)
    #[error("Request failed: {0}")]
    Http(String),

    /// The backend answered but the response is missing something the
    /// flow cannot continue without
    #[error("Unexpected backend response: {0}")]
    UnexpectedResponse(String),

    /// Reading operator input from the terminal failed
    #[error("Failed to read input: {0}")]
    Prompt(String),

    /// Configuration error (missing API key, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using the Perch error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Backend error with a code and message already separated
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }
}
