//! Age-based eviction of cached citations.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use super::clock::{Clock, SystemClock};
use crate::Error;
use crate::cache::CacheDb;

/// Deletes records older than the eviction threshold.
///
/// Evicted keys are not refetched here; the next read simply misses.
#[derive(Clone, Debug)]
pub struct StalenessSweeper {
    db: CacheDb,
    evict_after: Duration,
    clock: Arc<dyn Clock>,
}

impl StalenessSweeper {
    pub fn new(db: CacheDb, evict_after: Duration) -> Self {
        Self { db, evict_after, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one sweep. Returns the number of evicted records.
    ///
    /// Idempotent: an immediate second run evicts nothing.
    pub async fn run(&self) -> Result<u64, Error> {
        let now = self.clock.now();
        let evicted = self.db.sweep_stale_at(self.evict_after, now).await?;
        tracing::info!(evicted, evict_after_secs = self.evict_after.num_seconds(), "citation sweep finished");
        Ok(evicted)
    }
}

/// Next daily fire time for `at` (UTC) strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if today > now { today } else { today + Duration::days(1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::clock::FixedClock;
    use crate::scripture::CitationKey;
    use chrono::TimeZone;
    use serde_json::json;

    #[tokio::test]
    async fn test_run_evicts_and_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 6, 3, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let sweeper = StalenessSweeper::new(db.clone(), Duration::days(7)).with_clock(clock.clone());

        let old = CitationKey::new(205, 3, "7").unwrap();
        let stale = CitationKey::new(205, 3, "8").unwrap();
        db.upsert_citation(&old, &[json!("a")], now - Duration::days(10)).await.unwrap();
        db.upsert_citation(&stale, &[json!("b")], now - Duration::days(2)).await.unwrap();

        assert_eq!(sweeper.run().await.unwrap(), 1);
        assert_eq!(sweeper.run().await.unwrap(), 0);
        assert!(db.get_citation(&old).await.unwrap().is_none());
        assert!(db.get_citation(&stale).await.unwrap().is_some());

        clock.advance(Duration::days(6));
        assert_eq!(sweeper.run().await.unwrap(), 1);
        assert_eq!(db.count_citations().await.unwrap(), 0);
    }

    #[test]
    fn test_next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 4, 6, 1, 30, 0).unwrap();
        let at = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
        assert_eq!(next_run_after(now, at), Utc.with_ymd_and_hms(2024, 4, 6, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_tomorrow() {
        let at = NaiveTime::from_hms_opt(3, 0, 0).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 4, 6, 3, 0, 0).unwrap();
        assert_eq!(next_run_after(now, at), Utc.with_ymd_and_hms(2024, 4, 7, 3, 0, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(next_run_after(now, at), Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap());
    }
}
