//! Freshness policy for cached citations.
//!
//! Staleness is never stored. It is derived from `fetched_at` and the
//! policy at read time, so a record cannot drift out of sync with the clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Two independent age thresholds.
///
/// Past `stale_after` a record is still served but triggers a background
/// refresh. Past `evict_after` the sweeper deletes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub stale_after: Duration,
    pub evict_after: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self { stale_after: Duration::hours(24), evict_after: Duration::days(7) }
    }
}

impl FreshnessPolicy {
    pub fn new(stale_after: Duration, evict_after: Duration) -> Self {
        Self { stale_after, evict_after }
    }

    /// `now - fetched_at > stale_after`.
    pub fn is_stale(&self, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - fetched_at > self.stale_after
    }
}

/// Where a resolved answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationSource {
    CacheFresh,
    CacheStale,
    Live,
}

impl CitationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationSource::CacheFresh => "cache-fresh",
            CitationSource::CacheStale => "cache-stale",
            CitationSource::Live => "live",
        }
    }
}
