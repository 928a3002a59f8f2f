//! Cache-aside citation resolution with stale-while-revalidate.
//!
//! Fresh hits are served directly. Stale hits are served immediately while
//! a detached task refreshes the record. Misses block on a bounded upstream
//! fetch and write the result back. Store failures never fail a request
//! that has data to return.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;

use super::clock::{Clock, SystemClock};
use super::freshness::{CitationSource, FreshnessPolicy};
use super::upstream::{CitationFetcher, FetchError};
use crate::Error;
use crate::cache::{CacheDb, TalkRef};
use crate::scripture::CitationKey;

/// Tunables injected into [`CitationService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    pub policy: FreshnessPolicy,
    /// Bound on the synchronous fetch for a miss.
    pub live_timeout: Duration,
    /// Bound on the background refresh after a stale hit.
    pub refresh_timeout: Duration,
    /// Refreshes allowed in flight at once. Stale hits past this limit are
    /// served without scheduling a refresh.
    pub max_concurrent_refreshes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            policy: FreshnessPolicy::default(),
            live_timeout: Duration::from_secs(10),
            refresh_timeout: Duration::from_secs(60),
            max_concurrent_refreshes: 4,
        }
    }
}

/// Answer to a citation lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCitations {
    #[serde(flatten)]
    pub key: CitationKey,
    pub talks: Vec<TalkRef>,
    pub source: CitationSource,
}

/// Coordinates the citation store and the upstream fetcher.
#[derive(Clone)]
pub struct CitationService {
    db: CacheDb,
    fetcher: Arc<dyn CitationFetcher>,
    clock: Arc<dyn Clock>,
    config: ResolverConfig,
    refresh_permits: Arc<Semaphore>,
    refreshing: Arc<Mutex<HashSet<CitationKey>>>,
}

impl CitationService {
    pub fn new(db: CacheDb, fetcher: Arc<dyn CitationFetcher>, config: ResolverConfig) -> Self {
        Self {
            db,
            fetcher,
            clock: Arc::new(SystemClock),
            config,
            refresh_permits: Arc::new(Semaphore::new(config.max_concurrent_refreshes.max(1))),
            refreshing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the talks citing `book_id` `chapter`:`verse_spec`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if the reference is malformed.
    /// - `Error::UpstreamUnavailable` if nothing is cached and the live fetch
    ///   fails or times out.
    pub async fn resolve_citations(
        &self, book_id: i64, chapter: u32, verse_spec: &str,
    ) -> Result<ResolvedCitations, Error> {
        let key = CitationKey::new(book_id, chapter, verse_spec)?;
        self.resolve(key).await
    }

    /// Resolve an already normalized key.
    pub async fn resolve(&self, key: CitationKey) -> Result<ResolvedCitations, Error> {
        let now = self.clock.now();

        match self.db.get_citation_status(&key, &self.config.policy, now).await {
            Ok(Some(cached)) if !cached.talks.is_empty() => {
                let source = if cached.stale {
                    tracing::debug!(%key, fetched_at = %cached.fetched_at, "stale citation hit, refreshing in background");
                    self.spawn_refresh(key.clone());
                    CitationSource::CacheStale
                } else {
                    tracing::debug!(%key, "citation cache hit");
                    CitationSource::CacheFresh
                };
                return Ok(ResolvedCitations { key, talks: cached.talks, source });
            }
            Ok(_) => tracing::debug!(%key, "citation cache miss"),
            Err(e) => tracing::warn!(%key, error = %e, "citation store read failed, falling back to live fetch"),
        }

        let talks = self.fetch_live(&key).await?;

        if let Err(e) = self.db.upsert_citation(&key, &talks, self.clock.now()).await {
            tracing::warn!(%key, error = %e, "failed to cache citations");
        }

        Ok(ResolvedCitations { key, talks, source: CitationSource::Live })
    }

    async fn fetch_live(&self, key: &CitationKey) -> Result<Vec<TalkRef>, Error> {
        let timeout = self.config.live_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch_citations(key)).await {
            Ok(Ok(talks)) => Ok(talks),
            Ok(Err(e)) => {
                tracing::warn!(%key, error = %e, "live citation fetch failed");
                Err(Error::UpstreamUnavailable(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(%key, timeout_ms = timeout.as_millis() as u64, "live citation fetch timed out");
                Err(Error::UpstreamUnavailable(format!("no upstream response within {timeout:?}")))
            }
        }
    }

    /// Fire-and-forget refresh. The handle is dropped; nothing observes the
    /// outcome and a failure only means the next stale read tries again.
    ///
    /// At most one refresh per key and `max_concurrent_refreshes` overall are
    /// in flight. Anything beyond that is dropped, never queued.
    fn spawn_refresh(&self, key: CitationKey) {
        let Some(claim) = InFlight::claim(&self.refreshing, &key) else {
            tracing::debug!(%key, "refresh already in flight");
            return;
        };
        let Ok(permit) = Arc::clone(&self.refresh_permits).try_acquire_owned() else {
            tracing::debug!(%key, "refresh skipped, too many in flight");
            return;
        };

        let service = self.clone();
        tokio::spawn(async move {
            let _claim = claim;
            let _permit = permit;
            let fetch = service.fetcher.refresh_citations(&key);
            match tokio::time::timeout(service.config.refresh_timeout, fetch).await {
                Ok(Ok(talks)) => match service.db.upsert_citation(&key, &talks, service.clock.now()).await {
                    Ok(true) => tracing::debug!(%key, talks = talks.len(), "background refresh stored"),
                    Ok(false) => tracing::debug!(%key, "background refresh returned no citations, keeping stale record"),
                    Err(e) => tracing::warn!(%key, error = %e, "background refresh could not be stored"),
                },
                Ok(Err(FetchError::Throttled)) => tracing::debug!(%key, "background refresh skipped, upstream busy"),
                Ok(Err(e)) => tracing::debug!(%key, error = %e, "background refresh failed"),
                Err(_) => tracing::debug!(%key, "background refresh timed out"),
            }
        });
    }
}

/// Marks a key as being refreshed until dropped.
struct InFlight {
    keys: Arc<Mutex<HashSet<CitationKey>>>,
    key: CitationKey,
}

impl InFlight {
    fn claim(keys: &Arc<Mutex<HashSet<CitationKey>>>, key: &CitationKey) -> Option<Self> {
        let inserted = keys.lock().unwrap_or_else(PoisonError::into_inner).insert(key.clone());
        inserted.then(|| Self { keys: Arc::clone(keys), key: key.clone() })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.key);
    }
}
