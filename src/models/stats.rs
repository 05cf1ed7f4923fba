//! Game statistics as reported by the provider.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-user game statistics from the game status endpoint.
///
/// Every numeric field is required; a response missing one is treated as
/// malformed rather than silently zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct GameStats {
    #[validate(range(min = 0))]
    pub games_played: i64,
    #[validate(range(min = 0))]
    pub games_won: i64,
    pub user_score: i64,
    /// Display form of `user_score` (e.g. "1.2k")
    #[serde(default)]
    pub user_score_pretty: String,
    #[validate(range(min = 0))]
    pub max_lose_streak: i64,
    #[validate(range(min = 0))]
    pub lose_streak: i64,
    #[validate(range(min = 0))]
    pub max_win_streak: i64,
    #[validate(range(min = 0))]
    pub win_streak: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = serde_json::json!({
            "games_played": 5,
            "games_won": 2,
            "user_score": 10,
            "user_score_pretty": "10",
            "max_lose_streak": 3,
            "lose_streak": 0,
            "max_win_streak": 2,
            "win_streak": 1,
            "extra": "ignored"
        });

        let stats: GameStats = serde_json::from_value(json).unwrap();
        assert_eq!(stats.games_played, 5);
        assert_eq!(stats.max_lose_streak, 3);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = serde_json::json!({ "games_played": 5 });
        assert!(serde_json::from_value::<GameStats>(json).is_err());
    }

    #[test]
    fn test_negative_streak_fails_validation() {
        let stats = GameStats {
            max_win_streak: -1,
            ..GameStats::default()
        };
        assert!(stats.validate().is_err());
    }
}
