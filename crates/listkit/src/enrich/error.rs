use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an enrichment run.
///
/// Per-query extraction problems are not errors; they produce the
/// `No results` sentinel instead.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Failed to read browser session file '{path}': {source}")]
    SessionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed browser session file '{path}': {source}")]
    SessionParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid stored cookie '{name}': {message}")]
    InvalidCookie { name: String, message: String },

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open '{url}': {message}")]
    Navigation { url: String, message: String },

    #[error("Search input '{selector}' not ready after {timeout_secs}s")]
    InputNotReady { selector: String, timeout_secs: u64 },

    #[error("Browser page error: {0}")]
    Page(String),
}
