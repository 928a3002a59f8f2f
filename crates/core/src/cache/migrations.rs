//! Versioned schema for the citation store.

use super::Error;
use tokio_rusqlite::{Connection, params};

/// `(version, sql)` pairs, ascending.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_citations.sql"))];

/// Apply every migration newer than the highest version in `schema_version`.
///
/// Each migration commits together with its version row, so a failed batch
/// leaves the store at the previous version.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )?;
        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))?;

        for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version, "applied citation store migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scalar(conn: &Connection, sql: &'static str) -> i64 {
        conn.call(move |conn| conn.query_row(sql, [], |row| row.get(0))).await.unwrap()
    }

    #[tokio::test]
    async fn test_run_twice_is_a_noop() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let tables =
            scalar(&conn, "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='citations'").await;
        assert_eq!(tables, 1);
        assert_eq!(scalar(&conn, "SELECT COUNT(*) FROM schema_version").await, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn test_records_latest_version() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let latest = MIGRATIONS.last().map(|(v, _)| *v).unwrap();
        assert_eq!(scalar(&conn, "SELECT MAX(version) FROM schema_version").await, latest);
    }
}
