// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Imposter Leaderboard: sign in with Reddit and compare game statistics.
//!
//! This crate provides the web frontend (OAuth login plus leaderboard pages)
//! and the batch job that keeps every stored user's token and statistics fresh.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::UserStore;
use services::{AuthFlow, LeaderboardService, OAuthStateSigner, Provider, SessionTokens};
use std::sync::Arc;

/// Shared application state.
///
/// Built once at startup and handed to every request handler; dropping it
/// releases the HTTP client and database handles.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn UserStore>,
    pub sessions: SessionTokens,
    pub auth_flow: AuthFlow,
    pub leaderboards: LeaderboardService,
}

impl AppState {
    /// Wire the services together around one store and one provider client.
    pub fn new(config: Config, store: Arc<dyn UserStore>, provider: Arc<dyn Provider>) -> Self {
        let sessions = SessionTokens::new(&config.session_secret);
        let state_signer = OAuthStateSigner::new(&config.session_secret);
        let auth_flow = AuthFlow::new(
            provider,
            store.clone(),
            state_signer,
            config.login_redirect_uri(),
        );
        let leaderboards = LeaderboardService::new(store.clone());

        Self {
            config,
            store,
            sessions,
            auth_flow,
            leaderboards,
        }
    }
}
