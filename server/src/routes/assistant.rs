//! Assistant routes: chat replies and daily tips.

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use super::ApiError;
use super::auth::AuthUser;
use crate::services::assistant::{self, AssistantReply};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
}

/// `POST /api/assistant/chat`
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<AssistantReply>, ApiError> {
    let reply = assistant::chat(state.llm(), &state.rate_limiter, auth.user.id, &body.message).await?;
    Ok(Json(reply))
}

/// `GET /api/assistant/tip`
pub async fn tip(State(state): State<AppState>, auth: AuthUser) -> Result<Json<AssistantReply>, ApiError> {
    let reply = assistant::tip(state.llm(), &state.rate_limiter, state.records.as_ref(), auth.user.id).await?;
    Ok(Json(reply))
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
