//! Upstream fetcher seam.
//!
//! The resolver only knows this trait; the HTTP client lives in
//! `citecache-client`, and tests plug in their own doubles.

use async_trait::async_trait;

use crate::cache::TalkRef;
use crate::scripture::CitationKey;

/// Failure of a single upstream lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// No request budget was free and the caller asked not to wait.
    #[error("upstream request budget exhausted")]
    Throttled,
}

/// Looks up the talks that cite a passage.
#[async_trait]
pub trait CitationFetcher: Send + Sync {
    /// Fetch citing talks for a normalized key. An empty list means "no
    /// citations", not an error.
    async fn fetch_citations(&self, key: &CitationKey) -> Result<Vec<TalkRef>, FetchError>;

    /// Background variant of [`fetch_citations`](Self::fetch_citations).
    ///
    /// Implementations that pace requests must not queue here: if no slot is
    /// free right now they return `FetchError::Throttled`, so refreshes never
    /// delay a live lookup.
    async fn refresh_citations(&self, key: &CitationKey) -> Result<Vec<TalkRef>, FetchError> {
        self.fetch_citations(key).await
    }
}
