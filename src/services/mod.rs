// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth_flow;
pub mod leaderboard;
pub mod oauth_state;
pub mod reddit;
pub mod refresh;
pub mod session;

pub use auth_flow::{AuthFlow, CallbackParams, LoginOutcome, LoginStart};
pub use leaderboard::{HomeBoards, LeaderboardService, BOARD_SIZE};
pub use oauth_state::OAuthStateSigner;
pub use reddit::{Provider, ProviderError, RedditClient};
pub use refresh::{RefreshJob, RefreshReport};
pub use session::{SessionError, SessionTokens};
