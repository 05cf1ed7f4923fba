// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch refresh of every stored user's access token and game stats.
//!
//! Each pass walks all users sequentially. A user whose refresh fails is
//! logged and skipped; nothing about the failure is persisted and the next
//! pass tries again from scratch.

use std::sync::Arc;
use std::time::Duration;

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::{TokenUpdate, User, UserUpdate};
use crate::services::reddit::{Provider, ProviderError};

/// Counts from one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Why a single user could not be refreshed.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("No refresh token stored")]
    NoRefreshToken,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] AppError),
}

pub struct RefreshJob {
    provider: Arc<dyn Provider>,
    store: Arc<dyn UserStore>,
}

impl RefreshJob {
    pub fn new(provider: Arc<dyn Provider>, store: Arc<dyn UserStore>) -> Self {
        Self { provider, store }
    }

    /// Refresh every user once.
    ///
    /// Only a failure to list users aborts the pass.
    pub async fn run_once(&self) -> Result<RefreshReport, AppError> {
        let users = self.store.find_all().await?;
        let mut report = RefreshReport::default();

        tracing::info!(users = users.len(), "Starting refresh pass");

        for user in &users {
            report.attempted += 1;

            match self.refresh_user(user).await {
                Ok(()) => {
                    report.updated += 1;
                    tracing::info!(provider_id = %user.id, name = %user.name, "Updated user");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        provider_id = %user.id,
                        name = %user.name,
                        error = %e,
                        "Failed to refresh user"
                    );
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            updated = report.updated,
            failed = report.failed,
            "Refresh pass complete"
        );

        Ok(report)
    }

    /// Refresh grant, then stats, then one write. Nothing is written unless
    /// both provider calls succeed.
    async fn refresh_user(&self, user: &User) -> Result<(), RefreshError> {
        let refresh_token = user.refresh_token().ok_or(RefreshError::NoRefreshToken)?;

        let token = self.provider.refresh_token(refresh_token).await?;
        let stats = self.provider.fetch_stats(&token.access_token).await?;

        self.store
            .upsert_by_provider_id(
                &user.id,
                &UserUpdate {
                    profile: None,
                    token: Some(TokenUpdate::AccessToken {
                        access_token: token.access_token,
                        expires_at: Some(token.expires_at),
                    }),
                    stats: Some(stats),
                },
            )
            .await?;

        Ok(())
    }

    /// Run a pass every `period`, starting immediately. Never returns.
    pub async fn run_every(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Refresh pass aborted");
            }
        }
    }
}
