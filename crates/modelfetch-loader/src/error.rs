//! HTTP transport errors.
//!
//! These errors are internal to the HTTP backend and are mapped to
//! `LoadError` at the loader boundary.

use modelfetch_core::LoadError;
use thiserror::Error;

/// Result type alias for HTTP backend operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors raised by an [`HttpBackend`](crate::HttpBackend).
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("Request failed with status {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl HttpError {
    /// Map to the loader error reported for `uri`.
    pub fn into_load_error(self, uri: &str) -> LoadError {
        match self {
            Self::Status { status, .. } => LoadError::http_status(uri, status),
            Self::Network(e) => LoadError::Transport {
                uri: uri.to_string(),
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Self::InvalidUrl(e) => LoadError::transport(uri, format!("invalid URL: {e}")),
        }
    }
}
