// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refresh every stored user's Reddit token and game statistics.
//!
//! Runs a single pass and exits, or with `REFRESH_INTERVAL_SECS` set,
//! repeats forever on that period.

use imposter_leaderboard::{
    config::Config, db, logging::init_logging, services::RedditClient, services::RefreshJob,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    let interval = match std::env::var("REFRESH_INTERVAL_SECS") {
        Ok(v) => {
            let secs: u64 = v.trim().parse()?;
            if secs == 0 {
                return Err("REFRESH_INTERVAL_SECS must be positive".into());
            }
            Some(Duration::from_secs(secs))
        }
        Err(_) => None,
    };

    let store = db::connect(&config).await?;
    let provider = Arc::new(RedditClient::new(&config));
    let job = RefreshJob::new(provider, store);

    match interval {
        Some(period) => {
            tracing::info!(period_secs = period.as_secs(), "Starting periodic refresh");
            job.run_every(period).await;
        }
        None => {
            let report = job.run_once().await?;
            tracing::info!(
                attempted = report.attempted,
                updated = report.updated,
                failed = report.failed,
                "Refresh complete"
            );
        }
    }

    Ok(())
}
