//! `citecache-sweep`: one eviction pass for an external scheduler.
//!
//! Takes no arguments. Reads the same configuration as the server, deletes
//! records older than `evict_after_secs` and exits 0, or exits non-zero with
//! the error on stderr.

use anyhow::{Context, Result};
use citecache_core::{AppConfig, CacheDb, StalenessSweeper};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let evicted = sweep(&config).await?;

    tracing::info!(evicted, db_path = %config.db_path.display(), "sweep complete");
    Ok(())
}

async fn sweep(config: &AppConfig) -> Result<u64> {
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening citation store at {}", config.db_path.display()))?;

    let sweeper = StalenessSweeper::new(db, config.freshness_policy().evict_after);
    sweeper.run().await.context("sweeping citation store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use citecache_core::CitationKey;
    use serde_json::json;

    #[tokio::test]
    async fn test_sweep_against_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig { db_path: dir.path().join("citecache.sqlite"), ..Default::default() };

        {
            let db = CacheDb::open(&config.db_path).await.unwrap();
            let talks = vec![json!({"talkId": "t1"})];
            let old = CitationKey::new(302, 4, "1-7").unwrap();
            db.upsert_citation(&old, &talks, Utc::now() - Duration::days(30)).await.unwrap();
            let recent = CitationKey::new(302, 89, "18").unwrap();
            db.upsert_citation(&recent, &talks, Utc::now()).await.unwrap();
        }

        assert_eq!(sweep(&config).await.unwrap(), 1);
        assert_eq!(sweep(&config).await.unwrap(), 0);
    }
}
