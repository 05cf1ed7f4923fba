// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reddit API client for OAuth grants, profiles and game statistics.
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization-code and refresh-token grants (HTTP Basic client auth)
//! - Profile and statistics fetches (Bearer token)
//!
//! Every response is decoded into a typed structure and validated before it
//! leaves this module. Anything else surfaces as [`ProviderError::UpstreamData`].

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use validator::Validate;

use crate::config::Config;
use crate::models::{GameStats, Profile, ProviderToken};
use crate::time_utils::expiry_from_now;

/// Scope requested at login.
pub const OAUTH_SCOPE: &str = "identity";

/// Longest response body excerpt kept in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Errors from the Reddit API.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// OAuth-level refusal, e.g. `invalid_grant` for a revoked refresh token.
    #[error("{endpoint} rejected the request: {error}")]
    Rejected {
        endpoint: &'static str,
        error: String,
    },

    #[error("Token response contained no access token")]
    MissingAccessToken,

    /// Body was not JSON, lacked required fields, or failed validation.
    #[error("Malformed response from {endpoint}: {detail}")]
    UpstreamData {
        endpoint: &'static str,
        detail: String,
    },
}

/// Calls made against the OAuth provider.
///
/// [`RedditClient`] is the production implementation.
#[async_trait]
pub trait Provider: Send + Sync {
    /// URL the browser is sent to in order to grant access.
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> String;

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderToken, ProviderError>;

    /// Refresh-token grant. The returned token usually has no refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<ProviderToken, ProviderError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, ProviderError>;

    async fn fetch_stats(&self, access_token: &str) -> Result<GameStats, ProviderError>;
}

/// Reddit API client.
#[derive(Clone)]
pub struct RedditClient {
    http: reqwest::Client,
    auth_url: String,
    api_url: String,
    stats_url: String,
    client_id: String,
    client_secret: String,
    user_agent: String,
}

impl RedditClient {
    /// Create a client from the configured credentials and endpoints.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: config.reddit_auth_url.trim_end_matches('/').to_string(),
            api_url: config.reddit_api_url.trim_end_matches('/').to_string(),
            stats_url: config.game_stats_url.clone(),
            client_id: config.reddit_client_id.clone(),
            client_secret: config.reddit_client_secret.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// POST a grant to the token endpoint.
    async fn token_grant(&self, form: &[(&str, &str)]) -> Result<ProviderToken, ProviderError> {
        const ENDPOINT: &str = "access_token";

        let response = self
            .http
            .post(format!("{}/api/v1/access_token", self.auth_url))
            .header(USER_AGENT, &self.user_agent)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        // Reddit reports grant errors as JSON, sometimes with a 200 status,
        // so the body is inspected before the status code.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint: ENDPOINT,
                source,
            })?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => token.into_token(chrono::Utc::now()),
            Err(_) if !status.is_success() => Err(ProviderError::Status {
                endpoint: ENDPOINT,
                status: status.as_u16(),
                body: excerpt(&body),
            }),
            Err(e) => Err(ProviderError::UpstreamData {
                endpoint: ENDPOINT,
                detail: format!("{}: {}", e, excerpt(&body)),
            }),
        }
    }

    /// Generic Bearer GET with typed, validated JSON response.
    async fn get_json<T: DeserializeOwned + Validate>(
        &self,
        endpoint: &'static str,
        url: &str,
        access_token: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        check_response_json(endpoint, response).await
    }
}

#[async_trait]
impl Provider for RedditClient {
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> String {
        format!(
            "{}/api/v1/authorize?\
             client_id={}&\
             response_type=code&\
             state={}&\
             redirect_uri={}&\
             duration=permanent&\
             scope={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(state),
            urlencoding::encode(redirect_uri),
            OAUTH_SCOPE
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderToken, ProviderError> {
        self.token_grant(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<ProviderToken, ProviderError> {
        self.token_grant(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, ProviderError> {
        let url = format!("{}/api/v1/me", self.api_url);
        self.get_json("me", &url, access_token).await
    }

    async fn fetch_stats(&self, access_token: &str) -> Result<GameStats, ProviderError> {
        self.get_json("stats", &self.stats_url, access_token).await
    }
}

/// Check response status, then parse and validate the JSON body.
async fn check_response_json<T: DeserializeOwned + Validate>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { endpoint, source })?;

    if !status.is_success() {
        if status.as_u16() == 429 {
            tracing::warn!(endpoint, "Reddit rate limit hit (429)");
        }
        return Err(ProviderError::Status {
            endpoint,
            status: status.as_u16(),
            body: excerpt(&body),
        });
    }

    parse_validated(endpoint, &body)
}

/// Decode `body` into `T` and run its validation rules.
pub fn parse_validated<T: DeserializeOwned + Validate>(
    endpoint: &'static str,
    body: &str,
) -> Result<T, ProviderError> {
    let value: T = serde_json::from_str(body).map_err(|e| ProviderError::UpstreamData {
        endpoint,
        detail: format!("{}: {}", e, excerpt(body)),
    })?;

    value
        .validate()
        .map_err(|e| ProviderError::UpstreamData {
            endpoint,
            detail: e.to_string(),
        })?;

    Ok(value)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

/// Token endpoint response. Every field is optional on the wire.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    /// String (`invalid_grant`) or number (`401`) depending on the failure
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl TokenResponse {
    fn into_token(self, now: chrono::DateTime<chrono::Utc>) -> Result<ProviderToken, ProviderError> {
        if let Some(error) = self.error {
            let error = match error {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(ProviderError::Rejected {
                endpoint: "access_token",
                error,
            });
        }

        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingAccessToken)?;
        let expires_in = self.expires_in.unwrap_or_default();

        Ok(ProviderToken {
            access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in,
            expires_at: expiry_from_now(now, expires_in),
            scope: self.scope.unwrap_or_default(),
        })
    }
}
