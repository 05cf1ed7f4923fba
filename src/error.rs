// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent error pages.

use crate::services::reddit::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Returned `state` does not match the nonce issued for this browser.
    #[error("State mismatch")]
    StateMismatch,

    /// Reddit redirected back with an `error` parameter.
    #[error("There was an error authenticating with reddit: {0}")]
    ProviderDenied(String),

    /// Request could not be parsed, e.g. a malformed query string.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Reddit API error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StateMismatch => StatusCode::BAD_REQUEST,
            AppError::ProviderDenied(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the errors shown to users as an authentication failure.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, AppError::StateMismatch | AppError::ProviderDenied(_))
    }
}

/// Generic error page body.
#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_authentication_error() {
            tracing::warn!(error = %self, "Authentication failed");
        }

        let (error, message) = match &self {
            AppError::StateMismatch => ("bad_request", self.to_string()),
            AppError::ProviderDenied(_) => ("unauthorized", self.to_string()),
            AppError::BadRequest(_) => ("bad_request", self.to_string()),
            AppError::NotFound(_) => ("not_found", "Not Found".to_string()),
            AppError::MethodNotAllowed => ("method_not_allowed", self.to_string()),
            AppError::Upstream(err) => {
                tracing::warn!(error = %err, "Reddit API error");
                ("upstream_error", "Bad Gateway".to_string())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", "Internal Server Error".to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", "Internal Server Error".to_string())
            }
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
