//! User model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::GameStats;

/// User record stored in Firestore, one per Reddit account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Internal identifier, assigned at creation and referenced by sessions
    pub uid: String,
    /// Reddit account ID (also used as document ID)
    pub id: String,
    /// Reddit username
    pub name: String,
    /// Avatar URL
    #[serde(default)]
    pub icon_img: String,
    /// OAuth tokens from the last login or refresh
    #[serde(default)]
    pub token: Option<ProviderToken>,

    // ─── Game Stats ──────────────────────────────────────────────
    #[serde(default)]
    pub games_played: i64,
    #[serde(default)]
    pub games_won: i64,
    #[serde(default)]
    pub user_score: i64,
    #[serde(default)]
    pub user_score_pretty: String,
    #[serde(default)]
    pub max_lose_streak: i64,
    #[serde(default)]
    pub lose_streak: i64,
    #[serde(default)]
    pub max_win_streak: i64,
    #[serde(default)]
    pub win_streak: i64,

    // ─── Metadata ────────────────────────────────────────────────
    /// When the user first logged in (ISO 8601)
    pub created_at: String,
    /// Last write by login or refresh (ISO 8601)
    pub updated_at: String,
}

impl User {
    /// Empty record for a provider ID seen for the first time.
    pub fn new(uid: String, provider_id: &str, now: &str) -> Self {
        Self {
            uid,
            id: provider_id.to_string(),
            name: String::new(),
            icon_img: String::new(),
            token: None,
            games_played: 0,
            games_won: 0,
            user_score: 0,
            user_score_pretty: String::new(),
            max_lose_streak: 0,
            lose_streak: 0,
            max_win_streak: 0,
            win_streak: 0,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Overwrite the fields carried by `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &UserUpdate, now: &str) {
        if let Some(profile) = &update.profile {
            self.name = profile.name.clone();
            self.icon_img = profile.icon_img.clone();
        }

        match &update.token {
            Some(TokenUpdate::Replace(token)) => self.token = Some(token.clone()),
            Some(TokenUpdate::AccessToken {
                access_token,
                expires_at,
            }) => {
                if let Some(token) = self.token.as_mut() {
                    token.access_token = access_token.clone();
                    if let Some(expires_at) = expires_at {
                        token.expires_at = expires_at.clone();
                    }
                }
            }
            None => {}
        }

        if let Some(stats) = &update.stats {
            self.apply_stats(stats);
        }

        self.updated_at = now.to_string();
    }

    /// Statistics are provider-sourced and replaced wholesale.
    fn apply_stats(&mut self, stats: &GameStats) {
        self.games_played = stats.games_played;
        self.games_won = stats.games_won;
        self.user_score = stats.user_score;
        self.user_score_pretty = stats.user_score_pretty.clone();
        self.max_lose_streak = stats.max_lose_streak;
        self.lose_streak = stats.lose_streak;
        self.max_win_streak = stats.max_win_streak;
        self.win_streak = stats.win_streak;
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.token.as_ref().and_then(|t| t.refresh_token.as_deref())
    }
}

/// OAuth token pair as issued by Reddit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    /// Only issued for `duration=permanent` grants
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds as reported at issue time
    #[serde(default)]
    pub expires_in: i64,
    /// When the access token expires (ISO 8601)
    #[serde(default)]
    pub expires_at: String,
    #[serde(default)]
    pub scope: String,
}

/// Reddit account profile from `/api/v1/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Profile {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub icon_img: String,
}

/// How an upsert touches the stored token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenUpdate {
    /// New grant from a login.
    Replace(ProviderToken),
    /// Refresh grant: keep the refresh token, swap the access token.
    AccessToken {
        access_token: String,
        expires_at: Option<String>,
    },
}

/// Fields written by an upsert. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub profile: Option<Profile>,
    pub token: Option<TokenUpdate>,
    pub stats: Option<GameStats>,
}
