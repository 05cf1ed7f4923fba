// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod board;
pub mod stats;
pub mod user;

pub use board::{Board, UnknownBoard};
pub use stats::GameStats;
pub use user::{Profile, ProviderToken, TokenUpdate, User, UserUpdate};
