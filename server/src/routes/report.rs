//! Report route: plain-text health summary for sharing.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use time::OffsetDateTime;

use super::ApiError;
use super::auth::AuthUser;
use crate::services::report::build_report;
use crate::state::AppState;

/// `GET /api/report`
pub async fn report(State(state): State<AppState>, auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    let text = build_report(state.records.as_ref(), auth.user.id, OffsetDateTime::now_utc()).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
