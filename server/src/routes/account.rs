//! Account routes: profile rename and "reset all data".

use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};

use super::ApiError;
use super::auth::AuthUser;
use crate::services::account;
use crate::services::session::SessionUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    #[serde(default)]
    pub name: String,
}

/// `PATCH /api/account/profile`: change the display name.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ProfileBody>,
) -> Result<Json<SessionUser>, ApiError> {
    let user = account::rename(&state.pool, auth.user.id, &body.name).await?;
    Ok(Json(user))
}

/// `DELETE /api/account/data`: delete every record the user owns.
pub async fn reset_data(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let deleted = state.records.clear_user(auth.user.id).await?;
    tracing::info!(user_id = %auth.user.id, deleted, "user data reset");
    Ok(Json(json!({ "deleted": deleted })))
}
