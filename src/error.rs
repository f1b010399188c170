//! Error types for the wayfarer crate

use thiserror::Error;

/// Result type for wayfarer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for wayfarer operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid trip request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Page fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),
}
