// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home page and per-board leaderboard views.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::SessionUser;
use crate::models::{Board, User};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/{board}", get(board))
}

/// Public view of a user record. Tokens never leave the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub icon_img: String,
    pub games_played: i64,
    pub games_won: i64,
    pub user_score: i64,
    pub user_score_pretty: String,
    pub max_lose_streak: i64,
    pub lose_streak: i64,
    pub max_win_streak: i64,
    pub win_streak: i64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            icon_img: user.icon_img.clone(),
            games_played: user.games_played,
            games_won: user.games_won,
            user_score: user.user_score,
            user_score_pretty: user.user_score_pretty.clone(),
            max_lose_streak: user.max_lose_streak,
            lose_streak: user.lose_streak,
            max_win_streak: user.max_win_streak,
            win_streak: user.win_streak,
        }
    }
}

/// A leaderboard row; `rank` starts at 1.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub user: UserView,
}

fn ranked(users: &[User]) -> Vec<RankedEntry> {
    users
        .iter()
        .enumerate()
        .map(|(i, user)| RankedEntry {
            rank: i + 1,
            user: user.into(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub user: Option<UserView>,
    pub boards: Vec<Board>,
    pub win: Vec<RankedEntry>,
    pub lose: Vec<RankedEntry>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub user: Option<UserView>,
    pub board: Board,
    pub users: Vec<RankedEntry>,
}

/// Top win and lose streaks, plus the links to every board.
async fn home(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
) -> Result<Json<HomeResponse>> {
    let boards = state.leaderboards.home().await?;

    Ok(Json(HomeResponse {
        user: session.0.as_ref().map(UserView::from),
        boards: Board::ALL.to_vec(),
        win: ranked(&boards.win),
        lose: ranked(&boards.lose),
    }))
}

async fn board(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
    Path(name): Path<String>,
) -> Result<Json<BoardResponse>> {
    let (board, users) = state.leaderboards.board(&name).await?;

    Ok(Json(BoardResponse {
        user: session.0.as_ref().map(UserView::from),
        board,
        users: ranked(&users),
    }))
}
