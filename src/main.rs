// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Imposter Leaderboard web server
//!
//! Signs players in with Reddit and ranks them by their Imposter game
//! statistics.

use imposter_leaderboard::{
    config::Config, db, logging::init_logging, routes::create_router, services::RedditClient,
    AppState,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Imposter Leaderboard");

    let store = db::connect(&config).await?;
    let provider = Arc::new(RedditClient::new(&config));
    tracing::info!(
        redirect_uri = %config.login_redirect_uri(),
        "Reddit client initialized"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, store, provider));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
