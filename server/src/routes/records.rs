//! Record routes: list, create and delete documents in a user's collections.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::ApiError;
use super::auth::AuthUser;
use crate::services::records::{self, Collection, Record, RecordQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// `GET /api/records/{collection}?limit=n`: newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(collection): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let collection = Collection::parse(&collection)?;
    let query = RecordQuery::new(collection, auth.user.id).limit(params.limit);
    Ok(Json(state.records.query(&query).await?))
}

/// `POST /api/records/{collection}`: validate and store a new document.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(collection): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let collection = Collection::parse(&collection)?;
    let record = records::create_record(state.records.as_ref(), auth.user.id, collection, body).await?;
    tracing::info!(user_id = %auth.user.id, collection = collection.as_str(), record_id = %record.id, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /api/records/{collection}/{id}`: remove one of the user's documents.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((collection, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let collection = Collection::parse(&collection)?;
    state.records.delete(auth.user.id, collection, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
