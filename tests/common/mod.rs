// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use dashmap::DashMap;
use imposter_leaderboard::config::Config;
use imposter_leaderboard::db::{FirestoreDb, MemoryStore, UserStore};
use imposter_leaderboard::models::{GameStats, Profile, ProviderToken};
use imposter_leaderboard::routes::create_router;
use imposter_leaderboard::services::{Provider, ProviderError};
use imposter_leaderboard::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project", None)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// In-process stand-in for Reddit.
///
/// Codes map to access tokens, access tokens map to accounts, refresh
/// tokens map to new access tokens. Anything unknown is rejected the way
/// Reddit rejects it.
#[derive(Default)]
pub struct FakeProvider {
    codes: DashMap<String, (String, Option<String>)>,
    refreshes: DashMap<String, String>,
    profiles: DashMap<String, Profile>,
    stats: DashMap<String, GameStats>,
    pub refresh_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Authorization `code` grants `access_token` (empty means no token).
    pub fn grant_code(&self, code: &str, access_token: &str, refresh_token: Option<&str>) {
        self.codes.insert(
            code.to_string(),
            (access_token.to_string(), refresh_token.map(str::to_string)),
        );
    }

    pub fn grant_refresh(&self, refresh_token: &str, access_token: &str) {
        self.refreshes
            .insert(refresh_token.to_string(), access_token.to_string());
    }

    pub fn set_profile(&self, access_token: &str, profile: Profile) {
        self.profiles.insert(access_token.to_string(), profile);
    }

    pub fn set_stats(&self, access_token: &str, stats: GameStats) {
        self.stats.insert(access_token.to_string(), stats);
    }

    /// One account reachable through `code`, with profile and stats.
    pub fn add_account(&self, code: &str, access_token: &str, profile: Profile, stats: GameStats) {
        self.grant_code(code, access_token, Some(&format!("refresh-{access_token}")));
        self.set_profile(access_token, profile);
        self.set_stats(access_token, stats);
    }

    fn token(access_token: String, refresh_token: Option<String>) -> ProviderToken {
        ProviderToken {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: "2026-01-01T01:00:00Z".to_string(),
            scope: "identity".to_string(),
        }
    }

    fn invalid_grant() -> ProviderError {
        ProviderError::Rejected {
            endpoint: "access_token",
            error: "invalid_grant".to_string(),
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> String {
        format!(
            "https://fake.reddit.test/api/v1/authorize?state={}&redirect_uri={}",
            state,
            urlencoding::encode(redirect_uri)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<ProviderToken, ProviderError> {
        let (access_token, refresh_token) = self
            .codes
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(Self::invalid_grant)?;

        if access_token.is_empty() {
            return Err(ProviderError::MissingAccessToken);
        }
        Ok(Self::token(access_token, refresh_token))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<ProviderToken, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let access_token = self
            .refreshes
            .get(refresh_token)
            .map(|entry| entry.value().clone())
            .ok_or_else(Self::invalid_grant)?;
        Ok(Self::token(access_token, None))
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, ProviderError> {
        self.profiles
            .get(access_token)
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::Status {
                endpoint: "me",
                status: 401,
                body: "Unauthorized".to_string(),
            })
    }

    async fn fetch_stats(&self, access_token: &str) -> Result<GameStats, ProviderError> {
        self.stats
            .get(access_token)
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::Status {
                endpoint: "stats",
                status: 503,
                body: "Service Unavailable".to_string(),
            })
    }
}

#[allow(dead_code)]
pub fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: name.to_string(),
        icon_img: "x".to_string(),
    }
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(provider: Arc<FakeProvider>) -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Arc::new(MemoryStore::new()), provider)
}

#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    store: Arc<dyn UserStore>,
    provider: Arc<FakeProvider>,
) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store, provider));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Full `Set-Cookie` header for `name`, if the response set one.
#[allow(dead_code)]
pub fn find_cookie(response: &Response, name: &str) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{name}=")))
}

/// Value part of the `Set-Cookie` header for `name`.
#[allow(dead_code)]
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let header = find_cookie(response, name)?;
    let pair = header.split(';').next()?;
    pair.split_once('=').map(|(_, v)| v.to_string())
}

#[allow(dead_code)]
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Start a login and return the issued state value.
#[allow(dead_code)]
pub async fn begin_login(app: &Router) -> String {
    let response = app.clone().oneshot(get("/login")).await.unwrap();
    cookie_value(&response, "leaderboard_oauth_state").expect("state cookie not set")
}

/// Run the whole login handshake for `code`; returns the callback response.
#[allow(dead_code)]
pub async fn login(app: &Router, code: &str) -> Response {
    let state = begin_login(app).await;
    app.clone()
        .oneshot(get_with_cookie(
            &format!("/login?code={code}&state={state}"),
            &format!("leaderboard_oauth_state={state}"),
        ))
        .await
        .unwrap()
}

/// Session cookie pair (`name=value`) from a successful login.
#[allow(dead_code)]
pub async fn login_session(app: &Router, code: &str) -> String {
    let response = login(app, code).await;
    let token = cookie_value(&response, "leaderboard_session").expect("session cookie not set");
    format!("leaderboard_session={token}")
}
