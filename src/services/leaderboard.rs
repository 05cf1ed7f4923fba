// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard queries over the user store.

use std::sync::Arc;

use crate::db::{SortOrder, UserStore};
use crate::error::{AppError, Result};
use crate::models::{Board, User};

/// Entries shown per board.
pub const BOARD_SIZE: u32 = 50;

/// The two boards shown on the home page.
#[derive(Debug, Clone)]
pub struct HomeBoards {
    pub win: Vec<User>,
    pub lose: Vec<User>,
}

#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn UserStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Top users for a board given by name. Unknown names are `NotFound`.
    pub async fn board(&self, name: &str) -> Result<(Board, Vec<User>)> {
        let board: Board = name
            .parse()
            .map_err(|e: crate::models::UnknownBoard| AppError::NotFound(e.to_string()))?;

        let users = self.top(board).await?;
        Ok((board, users))
    }

    pub async fn top(&self, board: Board) -> Result<Vec<User>> {
        tracing::debug!(board = %board, "Fetching leaderboard");
        self.store
            .find_all_sorted_by(board, SortOrder::Descending, BOARD_SIZE)
            .await
    }

    /// Top win streaks and top lose streaks, fetched together.
    pub async fn home(&self) -> Result<HomeBoards> {
        let (win, lose) = tokio::try_join!(
            self.top(Board::MaxWinStreak),
            self.top(Board::MaxLoseStreak)
        )?;
        Ok(HomeBoards { win, lose })
    }
}
