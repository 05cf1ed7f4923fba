// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie resolution.

use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "leaderboard_session";

/// Cookie holding the OAuth state nonce during a login handshake.
pub const STATE_COOKIE: &str = "leaderboard_oauth_state";

/// The logged-in user for this request, if any.
///
/// Resolved once per request by [`resolve_session`].
#[derive(Debug, Clone, Default)]
pub struct SessionUser(pub Option<User>);

/// Middleware that loads the user referenced by the session cookie.
///
/// A missing, tampered or expired token, or one naming a user that no
/// longer exists, yields `SessionUser(None)`. Store failures propagate.
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match state.sessions.decode(cookie.value()) {
            Ok(uid) => state.store.find_by_id(&uid).await?,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(SessionUser(user));

    Ok(next.run(request).await)
}
