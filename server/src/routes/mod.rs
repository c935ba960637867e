//! Router assembly and shared HTTP error plumbing.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API consumed by the client core and the CLI. Every route except
//! sign-up, login and `/healthz` requires an authenticated session, and every
//! record route scopes its query to that session's user.

pub mod account;
pub mod assistant;
pub mod auth;
pub mod records;
pub mod report;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::account::AccountError;
use crate::services::assistant::AssistantError;
use crate::services::records::RecordError;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/account/profile", patch(account::update_profile))
        .route("/api/account/data", delete(account::reset_data))
        .route("/api/records/{collection}", get(records::list).post(records::create))
        .route("/api/records/{collection}/{id}", delete(records::remove))
        .route("/api/report", get(report::report))
        .route("/api/assistant/chat", post(assistant::chat))
        .route("/api/assistant/tip", get(assistant::tip))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON error response: `{ "error": "<message>" }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl std::fmt::Display) -> Self {
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
            return Self { status, message: "internal error".into() };
        }
        Self { status, message: message.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub(crate) fn account_error_to_status(err: &AccountError) -> StatusCode {
    match err {
        AccountError::MissingField(_)
        | AccountError::InvalidEmail
        | AccountError::WeakPassword
        | AccountError::NameTooLong => StatusCode::BAD_REQUEST,
        AccountError::EmailTaken => StatusCode::CONFLICT,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::NotFound(_) => StatusCode::NOT_FOUND,
        AccountError::Hashing(_) | AccountError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn record_error_to_status(err: &RecordError) -> StatusCode {
    match err {
        RecordError::UnknownCollection(_) | RecordError::NotFound(_) => StatusCode::NOT_FOUND,
        RecordError::Malformed(_) | RecordError::MissingField(_) | RecordError::OutOfRange(_) => {
            StatusCode::BAD_REQUEST
        }
        RecordError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn assistant_error_to_status(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::EmptyMessage | AssistantError::MessageTooLong => StatusCode::BAD_REQUEST,
        AssistantError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AssistantError::Records(e) => record_error_to_status(e),
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self::new(account_error_to_status(&err), err)
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        Self::new(record_error_to_status(&err), err)
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self::new(assistant_error_to_status(&err), err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
