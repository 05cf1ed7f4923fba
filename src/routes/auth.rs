// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reddit OAuth login and logout routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::session::{SessionUser, SESSION_COOKIE, STATE_COOKIE};
use crate::services::session::SESSION_TTL_SECS;
use crate::services::{CallbackParams, LoginOutcome};
use crate::AppState;

/// Path of the login route, which is also the OAuth callback.
pub const LOGIN_PATH: &str = "/login";

/// The state cookie only needs to survive one trip to Reddit and back.
const STATE_COOKIE_MAX_AGE_SECS: i64 = 15 * 60;

/// Routes that need the session resolved.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(LOGIN_PATH, get(login))
}

/// Logout must work even when the session cannot be looked up.
pub fn logout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/logout", get(logout))
}

/// Start or finish the OAuth flow.
///
/// - valid session: nothing to do, back to `/`
/// - no `code`/`error`: remember a state nonce and redirect to Reddit
/// - otherwise: complete the exchange and establish the session
async fn login(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionUser>,
    jar: CookieJar,
    params: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let secure = state.config.secure_cookies();

    if session.0.is_some() {
        // Any pending nonce is dead once a session exists.
        let jar = jar.remove(state_cookie(String::new(), secure));
        return Ok((jar, Redirect::temporary("/")).into_response());
    }

    if !params.is_callback() {
        let start = state.auth_flow.begin()?;
        let jar = jar.add(state_cookie(start.state, secure));
        return Ok((jar, Redirect::temporary(&start.authorize_url)).into_response());
    }

    // The nonce is single-use whatever the outcome.
    let issued_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(state_cookie(String::new(), secure));

    match state
        .auth_flow
        .complete(&params, issued_state.as_deref())
        .await
    {
        Ok(LoginOutcome::LoggedIn(user)) => {
            let token = state
                .sessions
                .encode(&user.uid)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Session creation failed: {}", e)))?;

            let jar = jar.add(session_cookie(token, secure));
            Ok((jar, Redirect::temporary("/")).into_response())
        }
        Ok(LoginOutcome::Abandoned(e)) => {
            tracing::info!(error = %e, "Login abandoned, clearing session");
            Ok((jar, Redirect::temporary("/logout")).into_response())
        }
        Err(e) => Ok((jar, e).into_response()),
    }
}

/// Logout - clear session cookies and go home.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let secure = state.config.secure_cookies();
    let jar = jar
        .remove(session_cookie(String::new(), secure))
        .remove(state_cookie(String::new(), secure));

    (jar, Redirect::temporary("/"))
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path(LOGIN_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(STATE_COOKIE_MAX_AGE_SECS))
        .build()
}
