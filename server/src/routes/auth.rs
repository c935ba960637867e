//! Auth routes: email/password sign-up and login, session lookup, logout.

use axum::extract::{FromRef, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use super::ApiError;
use crate::services::account::{self, NewAccount};
use crate::services::session::{self, SessionUser};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const SESSION_COOKIE_DAYS: i64 = 30;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(max_age)
        .build()
}

/// Token from `Authorization: Bearer <token>`, falling back to the session cookie.
pub(crate) fn request_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }
    CookieJar::from_headers(headers)
        .get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the bearer token or session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = request_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                StatusCode::INTERNAL_SERVER_ERROR
            })?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token })
    }
}

// =============================================================================
// BODIES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

async fn start_session(state: &AppState, user: SessionUser, status: StatusCode) -> Result<Response, ApiError> {
    let token = session::create_session(&state.pool, user.id).await?;
    let jar = CookieJar::new().add(session_cookie(token.clone(), Duration::days(SESSION_COOKIE_DAYS)));
    Ok((status, jar, Json(AuthResponse { token, user })).into_response())
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/signup`: create an account and sign it in.
pub async fn signup(State(state): State<AppState>, Json(body): Json<SignupBody>) -> Result<Response, ApiError> {
    let new_account = NewAccount::parse(&body.name, &body.email, &body.password)?;
    let user = account::create_account(&state.pool, &new_account).await?;
    tracing::info!(user_id = %user.id, "account created");
    start_session(&state, user, StatusCode::CREATED).await
}

/// `POST /api/auth/login`: exchange email and password for a session token.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Result<Response, ApiError> {
    let user = account::authenticate(&state.pool, &body.email, &body.password).await?;
    tracing::info!(user_id = %user.id, "signed in");
    start_session(&state, user, StatusCode::OK).await
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: delete session, clear cookie.
///
/// The session row must be gone before the client is told it signed out, so
/// a storage failure is reported instead of swallowed.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    session::delete_session(&state.pool, &auth.token).await?;
    tracing::info!(user_id = %auth.user.id, "signed out");
    let jar = CookieJar::new().add(session_cookie(String::new(), Duration::ZERO));
    Ok((jar, StatusCode::NO_CONTENT).into_response())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
