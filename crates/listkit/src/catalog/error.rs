//! Catalog API error types.

use thiserror::Error;

/// Errors raised by catalog API calls.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Remote API error ({status}): {body}")]
    RemoteApi { status: u16, body: String },

    /// The API answered 2xx but the payload did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The configured credentials cannot be sent as HTTP headers.
    #[error("Invalid credential header: {0}")]
    InvalidCredential(String),
}

impl CatalogError {
    /// HTTP status for remote rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::RemoteApi { status, .. } => Some(*status),
            CatalogError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
