// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod pages;

use crate::error::AppError;
use crate::middleware::resolve_session;
use crate::AppState;
use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Anything that is neither a page nor a board.
async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // `/login` and `/logout` are matched before the `/{board}` capture.
    let routes = Router::new()
        .merge(auth::routes())
        .merge(pages::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .merge(auth::logout_routes());

    routes
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::security::add_security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
