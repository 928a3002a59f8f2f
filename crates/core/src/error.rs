//! Unified error types for citecache.
//!
//! Every variant renders with a stable code prefix so logs, HTTP bodies and
//! MCP errors all carry the same identifier.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error type for the citation cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed reference (missing field, bad chapter, bad verse range).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Book (and volume) could not be mapped to a citation index id.
    #[error("UNKNOWN_BOOK: {0}")]
    UnknownBook(String),

    /// Live fetch failed or timed out and there was nothing cached to serve.
    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded.
    #[error("CACHE_ERROR: corrupt record: {0}")]
    CorruptRecord(String),
}

impl Error {
    /// Stable code for the error kind, as used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::UnknownBook(_) => "UNKNOWN_BOOK",
            Error::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptRecord(_) => "CACHE_ERROR",
        }
    }

    /// True for caller mistakes. These must not be retried.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::UnknownBook(_))
    }

    /// True when a client may reasonably try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::UnknownBook(msg) => (-32003, msg.clone()),
            Error::UpstreamUnavailable(msg) => (-32006, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptRecord(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
