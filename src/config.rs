//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. A `.env` file in the working
//! directory is honored for local development.

use std::env;

/// Default User-Agent sent to Reddit, which rejects generic agents.
pub const DEFAULT_USER_AGENT: &str = "imposter-leaderboard/0.1";

/// Where user records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Reddit OAuth ---
    /// Reddit OAuth client ID
    pub reddit_client_id: String,
    /// Reddit OAuth client secret
    pub reddit_client_secret: String,
    /// Public base URL of this service; the OAuth callback is `<base>/login`
    pub redirect_uri_base: String,
    /// User-Agent for all provider requests
    pub user_agent: String,

    // --- Provider endpoints ---
    /// Host serving `/api/v1/authorize` and `/api/v1/access_token`
    pub reddit_auth_url: String,
    /// Host serving `/api/v1/me`
    pub reddit_api_url: String,
    /// Full URL of the game statistics endpoint
    pub game_stats_url: String,

    // --- Storage ---
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Firestore database name
    pub firestore_database_id: Option<String>,

    // --- Server ---
    /// Server port
    pub port: u16,
    /// Signing key for session and OAuth state tokens (raw bytes)
    pub session_secret: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        let gcp_project_id = match store_backend {
            StoreBackend::Firestore => {
                env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?
            }
            StoreBackend::Memory => {
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string())
            }
        };

        Ok(Self {
            reddit_client_id: required("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required("REDDIT_CLIENT_SECRET")?,
            redirect_uri_base: required("REDIRECT_URI_BASE")?
                .trim_end_matches('/')
                .to_string(),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),

            reddit_auth_url: env::var("REDDIT_AUTH_URL")
                .unwrap_or_else(|_| "https://www.reddit.com".to_string()),
            reddit_api_url: env::var("REDDIT_API_URL")
                .unwrap_or_else(|_| "https://oauth.reddit.com".to_string()),
            game_stats_url: env::var("GAME_STATS_URL")
                .unwrap_or_else(|_| "https://gremlins-api.reddit.com/status".to_string()),

            store_backend,
            gcp_project_id,
            firestore_database_id: env::var("FIRESTORE_DATABASE_ID").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_secret: required("SESSION_SECRET")?.into_bytes(),
        })
    }

    /// Config with fixed values for tests. Provider URLs point nowhere.
    pub fn test_default() -> Self {
        Self {
            reddit_client_id: "test_client_id".to_string(),
            reddit_client_secret: "test_secret".to_string(),
            redirect_uri_base: "http://localhost:8080".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            reddit_auth_url: "http://127.0.0.1:9".to_string(),
            reddit_api_url: "http://127.0.0.1:9".to_string(),
            game_stats_url: "http://127.0.0.1:9/status".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            firestore_database_id: None,
            port: 8080,
            session_secret: b"test_session_key_32_bytes_min!!".to_vec(),
        }
    }

    /// OAuth callback URL registered with Reddit.
    pub fn login_redirect_uri(&self) -> String {
        format!("{}/login", self.redirect_uri_base)
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.redirect_uri_base.starts_with("https://")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
