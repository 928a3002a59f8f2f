//! Citation index client error types.

use std::sync::Arc;

use citecache_core::FetchError;

/// Errors from the citation index HTTP client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CitationApiError {
    /// No base URL configured.
    #[error("missing base URL for the citation index")]
    MissingBaseUrl,

    /// Base URL did not parse.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Rate limited by the citation index.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response body was not a talk list.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CitationApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { CitationApiError::Timeout } else { CitationApiError::Network(Arc::new(err)) }
    }
}

impl From<CitationApiError> for FetchError {
    fn from(err: CitationApiError) -> Self {
        match err {
            CitationApiError::Timeout => FetchError::Timeout,
            other => FetchError::Unavailable(other.to_string()),
        }
    }
}
