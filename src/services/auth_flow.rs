// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reddit OAuth login: authorization redirect and code exchange.

use serde::Deserialize;
use std::sync::Arc;

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{TokenUpdate, User, UserUpdate};
use crate::services::oauth_state::OAuthStateSigner;
use crate::services::reddit::{Provider, ProviderError};

/// Query parameters Reddit appends when redirecting back to `/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CallbackParams {
    /// Reddit redirects back with either a code or an error.
    pub fn is_callback(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

/// Where to send the browser to start a login.
#[derive(Debug, Clone)]
pub struct LoginStart {
    pub authorize_url: String,
    /// Signed nonce to remember for this browser
    pub state: String,
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// Record written; the session should reference `user.uid`.
    LoggedIn(User),
    /// Reddit gave no usable token or profile; the session should be cleared.
    Abandoned(ProviderError),
}

/// Orchestrates the authorization-code flow.
pub struct AuthFlow {
    provider: Arc<dyn Provider>,
    store: Arc<dyn UserStore>,
    state_signer: OAuthStateSigner,
    redirect_uri: String,
}

impl AuthFlow {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn UserStore>,
        state_signer: OAuthStateSigner,
        redirect_uri: String,
    ) -> Self {
        Self {
            provider,
            store,
            state_signer,
            redirect_uri,
        }
    }

    /// Issue a state nonce and build the Reddit authorization URL.
    pub fn begin(&self) -> Result<LoginStart> {
        let state = self.state_signer.issue()?;
        let authorize_url = self.provider.authorize_url(&state, &self.redirect_uri);

        tracing::info!("Starting OAuth flow, redirecting to Reddit");

        Ok(LoginStart {
            authorize_url,
            state,
        })
    }

    /// Finish the login Reddit redirected back with.
    ///
    /// `issued_state` is the nonce stored for this browser by [`Self::begin`].
    /// State and provider errors fail the request; a failed exchange or
    /// profile fetch yields [`LoginOutcome::Abandoned`]. Statistics are
    /// best-effort: if they cannot be fetched the login still succeeds.
    pub async fn complete(
        &self,
        params: &CallbackParams,
        issued_state: Option<&str>,
    ) -> Result<LoginOutcome> {
        let state_ok = match (params.state.as_deref(), issued_state) {
            (Some(returned), Some(issued)) => self.state_signer.verify(returned, issued),
            _ => false,
        };
        if !state_ok {
            tracing::warn!("OAuth callback with mismatched state");
            return Err(AppError::StateMismatch);
        }

        if let Some(error) = &params.error {
            tracing::warn!(error = %error, "OAuth error from Reddit");
            return Err(AppError::ProviderDenied(error.clone()));
        }

        let Some(code) = params.code.as_deref() else {
            return Err(AppError::ProviderDenied(
                "no authorization code returned".to_string(),
            ));
        };

        tracing::info!("Exchanging authorization code for tokens");

        let token = match self.provider.exchange_code(code, &self.redirect_uri).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token exchange failed");
                return Ok(LoginOutcome::Abandoned(e));
            }
        };

        let profile = match self.provider.fetch_profile(&token.access_token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Could not retrieve Reddit profile");
                return Ok(LoginOutcome::Abandoned(e));
            }
        };

        let stats = match self.provider.fetch_stats(&token.access_token).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!(
                    provider_id = %profile.id,
                    error = %e,
                    "Could not retrieve game stats, keeping previous values"
                );
                None
            }
        };

        let provider_id = profile.id.clone();
        let user = self
            .store
            .upsert_by_provider_id(
                &provider_id,
                &UserUpdate {
                    profile: Some(profile),
                    token: Some(TokenUpdate::Replace(token)),
                    stats,
                },
            )
            .await?;

        tracing::info!(
            provider_id = %user.id,
            name = %user.name,
            "OAuth successful, user stored"
        );

        Ok(LoginOutcome::LoggedIn(user))
    }
}
