//! Error types for qrmint operations

use thiserror::Error;

/// Result type alias using qrmint's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrmint operations
#[derive(Error, Debug)]
pub enum Error {
    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Remote document store error (transport, auth, or unexpected status)
    #[error("Document store error: {0}")]
    Store(String),

    /// Allocator gave up after the configured number of candidate attempts
    #[error("No unused identifier found in collection '{collection}' after {attempts} attempts")]
    KeyspaceExhausted {
        /// Collection the allocation was attempted against
        collection: String,
        /// Number of candidates tried before giving up
        attempts: u32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

// Implement From conversions for common error types

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Store(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("JSON error: {}", e))
    }
}
