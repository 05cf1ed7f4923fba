// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Leaderboard names and the statistic each one ranks by.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::models::User;

/// A leaderboard. The set is fixed; anything else is not a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Board {
    GamesPlayed,
    GamesWon,
    MaxLoseStreak,
    MaxWinStreak,
    UserScore,
}

impl Board {
    pub const ALL: [Board; 5] = [
        Board::GamesPlayed,
        Board::GamesWon,
        Board::MaxLoseStreak,
        Board::MaxWinStreak,
        Board::UserScore,
    ];

    /// Board name, which is also the stored field it sorts by.
    pub fn as_str(self) -> &'static str {
        match self {
            Board::GamesPlayed => "games_played",
            Board::GamesWon => "games_won",
            Board::MaxLoseStreak => "max_lose_streak",
            Board::MaxWinStreak => "max_win_streak",
            Board::UserScore => "user_score",
        }
    }

    /// The statistic this board ranks `user` by.
    pub fn value_of(self, user: &User) -> i64 {
        match self {
            Board::GamesPlayed => user.games_played,
            Board::GamesWon => user.games_won,
            Board::MaxLoseStreak => user.max_lose_streak,
            Board::MaxWinStreak => user.max_win_streak,
            Board::UserScore => user.user_score,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown board: {0}")]
pub struct UnknownBoard(pub String);

impl FromStr for Board {
    type Err = UnknownBoard;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| UnknownBoard(s.to_string()))
    }
}
