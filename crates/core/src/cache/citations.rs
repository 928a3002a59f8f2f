//! Citation record operations.
//!
//! `get`, `upsert` and `sweep` for cached citation lookups. The store never
//! inspects talk payloads and never persists an empty result.

use super::connection::CacheDb;
use super::hash::compute_citation_hash;
use crate::Error;
use crate::resolver::FreshnessPolicy;
use crate::scripture::CitationKey;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Opaque talk summary forwarded verbatim from upstream.
pub type TalkRef = serde_json::Value;

/// A cached upstream lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRecord {
    pub key: CitationKey,
    pub talks: Vec<TalkRef>,
    pub fetched_at: DateTime<Utc>,
}

/// Result of a status read: the cached talks plus the derived staleness flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedCitation {
    pub talks: Vec<TalkRef>,
    pub stale: bool,
    #[serde(skip)]
    pub fetched_at: DateTime<Utc>,
}

/// RFC 3339 with fixed nanosecond precision: exact round-trip, lexical order
/// matches chronological order.
fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::CorruptRecord(format!("fetched_at {raw:?}: {e}")))
}

impl CacheDb {
    /// Get the cached record for a key.
    ///
    /// Returns None if nothing is cached.
    pub async fn get_citation(&self, key: &CitationKey) -> Result<Option<CitationRecord>, Error> {
        let hash = compute_citation_hash(key);
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, Error> {
                let mut stmt = conn.prepare("SELECT talks_json, fetched_at FROM citations WHERE key_hash = ?1")?;

                match stmt.query_row(params![hash], |row| Ok((row.get(0)?, row.get(1)?))) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((talks_json, fetched_at)) = row else {
            return Ok(None);
        };

        let talks: Vec<TalkRef> = serde_json::from_str(&talks_json)
            .map_err(|e| Error::CorruptRecord(format!("talks_json for {key}: {e}")))?;

        Ok(Some(CitationRecord { key: key.clone(), talks, fetched_at: decode_timestamp(&fetched_at)? }))
    }

    /// Get cached talks together with their staleness under `policy`.
    ///
    /// Staleness is computed here so callers never derive it from
    /// `fetched_at` on their own.
    pub async fn get_citation_status(
        &self, key: &CitationKey, policy: &FreshnessPolicy, now: DateTime<Utc>,
    ) -> Result<Option<CachedCitation>, Error> {
        Ok(self.get_citation(key).await?.map(|record| CachedCitation {
            stale: policy.is_stale(record.fetched_at, now),
            fetched_at: record.fetched_at,
            talks: record.talks,
        }))
    }

    /// Insert or overwrite the record for a key.
    ///
    /// Empty `talks` are ignored so "no results" is never cached; returns
    /// whether a row was written.
    pub async fn upsert_citation(
        &self, key: &CitationKey, talks: &[TalkRef], fetched_at: DateTime<Utc>,
    ) -> Result<bool, Error> {
        if talks.is_empty() {
            tracing::debug!(%key, "skipping upsert of empty citation list");
            return Ok(false);
        }

        let hash = compute_citation_hash(key);
        let talks_json = serde_json::to_string(talks)
            .map_err(|e| Error::CorruptRecord(format!("failed to encode talks for {key}: {e}")))?;
        let fetched_at = encode_timestamp(fetched_at);
        let key = key.clone();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO citations (key_hash, book_id, chapter, verse_spec, talks_json, fetched_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(key_hash) DO UPDATE SET
                        talks_json = excluded.talks_json,
                        fetched_at = excluded.fetched_at",
                    params![hash, key.book_id, key.chapter, key.verse_spec, talks_json, fetched_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(true)
    }

    /// Delete records older than `evict_after`, measured from now.
    ///
    /// Returns the number of deleted entries.
    pub async fn sweep_stale(&self, evict_after: Duration) -> Result<u64, Error> {
        self.sweep_stale_at(evict_after, Utc::now()).await
    }

    /// Delete every record with `now - fetched_at > evict_after`.
    ///
    /// Returns the number of deleted entries, or `Error::InvalidInput` if the
    /// cutoff falls outside the representable date range.
    pub async fn sweep_stale_at(&self, evict_after: Duration, now: DateTime<Utc>) -> Result<u64, Error> {
        if evict_after < Duration::zero() {
            return Err(Error::InvalidInput(format!("eviction threshold must not be negative, got {evict_after}")));
        }
        let cutoff = now
            .checked_sub_signed(evict_after)
            .ok_or_else(|| Error::InvalidInput(format!("eviction threshold {evict_after} is out of range")))?;
        let cutoff = encode_timestamp(cutoff);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM citations WHERE fetched_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of cached records.
    pub async fn count_citations(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM citations", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
