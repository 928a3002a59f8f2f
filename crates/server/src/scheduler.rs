//! In-process daily sweep.

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use citecache_core::{StalenessSweeper, next_run_after};
use tokio::task::JoinHandle;

/// How long to sleep from `now` until the next `at` (UTC).
pub fn delay_until_next(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    (next_run_after(now, at) - now).to_std().unwrap_or(Duration::ZERO)
}

/// Run the sweeper once a day at `at` (UTC) until the runtime shuts down.
///
/// A failed sweep is logged and retried at the next scheduled time.
pub fn spawn_daily_sweep(sweeper: StalenessSweeper, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = delay_until_next(Utc::now(), at);
            tracing::info!(next_in_secs = delay.as_secs(), sweep_at = %at, "next citation sweep scheduled");
            tokio::time::sleep(delay).await;

            if let Err(e) = sweeper.run().await {
                tracing::error!(error = %e, "citation sweep failed");
            }
        }
    })
}
