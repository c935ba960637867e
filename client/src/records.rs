//! Per-user health records.
//!
//! Every call takes the caller's [`Session`] explicitly. Nothing is sent for
//! a signed-out session, and records that come back owned by anyone other
//! than the session's user are dropped before the caller sees them.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{Record, User};
use crate::session::Session;

/// Presets offered by the symptom screen.
pub const COMMON_SYMPTOMS: [&str; 5] = ["Headache", "Dizziness", "Fatigue", "Palpitations", "Swelling"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    BpReadings,
    Medications,
    FoodLogs,
    Symptoms,
    Journal,
}

impl Collection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BpReadings => "bp_readings",
            Self::Medications => "medications",
            Self::FoodLogs => "food_logs",
            Self::Symptoms => "symptoms",
            Self::Journal => "journal",
        }
    }
}

// =============================================================================
// ENTRIES
// =============================================================================

/// Typed body of one collection.
pub trait Entry: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpEntry {
    pub systolic: i64,
    pub diastolic: i64,
}

impl BpEntry {
    /// Hypertensive crisis: see a doctor now.
    #[must_use]
    pub fn is_crisis(&self) -> bool {
        self.systolic > 180 || self.diastolic > 120
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub reminder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub meal: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub symptom: String,
    #[serde(default = "default_severity")]
    pub severity: i64,
    #[serde(default)]
    pub notes: String,
}

fn default_severity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
}

impl Entry for BpEntry {
    const COLLECTION: Collection = Collection::BpReadings;
}
impl Entry for MedicationEntry {
    const COLLECTION: Collection = Collection::Medications;
}
impl Entry for FoodEntry {
    const COLLECTION: Collection = Collection::FoodLogs;
}
impl Entry for SymptomEntry {
    const COLLECTION: Collection = Collection::Symptoms;
}
impl Entry for JournalEntry {
    const COLLECTION: Collection = Collection::Journal;
}

// =============================================================================
// SCOPING
// =============================================================================

fn require_user(session: &Session) -> Result<&str, ApiError> {
    match session.user_id() {
        Some(user_id) if session.is_authenticated() => Ok(user_id),
        _ => Err(ApiError::NotAuthenticated),
    }
}

/// Keep only records owned by `user_id`.
pub(crate) fn retain_owned(user_id: &str, records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| {
            let owned = r.user_id == user_id;
            if !owned {
                warn!(%user_id, record_id = %r.id, owner = %r.user_id, "dropping record owned by another user");
            }
            owned
        })
        .collect()
}

#[derive(Deserialize)]
struct ResetResponse {
    deleted: u64,
}

#[derive(Serialize)]
struct ProfileBody<'a> {
    name: &'a str,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct Records {
    api: ApiClient,
}

impl Records {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, otherwise
    /// the request's failure.
    pub async fn list(&self, session: &Session, collection: Collection, limit: Option<u32>) -> Result<Vec<Record>, ApiError> {
        let user_id = require_user(session)?;
        let path = match limit {
            Some(limit) => format!("/api/records/{}?limit={limit}", collection.as_str()),
            None => format!("/api/records/{}", collection.as_str()),
        };
        let records: Vec<Record> = self.api.get_json(&path).await?;
        Ok(retain_owned(user_id, records))
    }

    /// [`list`](Self::list) that logs failures and yields an empty list.
    pub async fn list_or_empty(&self, session: &Session, collection: Collection, limit: Option<u32>) -> Vec<Record> {
        self.list(session, collection, limit).await.unwrap_or_else(|e| {
            warn!(collection = collection.as_str(), error = %e, "failed to load records");
            Vec::new()
        })
    }

    /// Typed entries, newest first. Bodies that fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// See [`list`](Self::list).
    pub async fn recent<E: Entry>(&self, session: &Session, limit: Option<u32>) -> Result<Vec<(Record, E)>, ApiError> {
        let records = self.list(session, E::COLLECTION, limit).await?;
        Ok(records
            .into_iter()
            .filter_map(|r| match serde_json::from_value::<E>(r.body.clone()) {
                Ok(entry) => Some((r, entry)),
                Err(e) => {
                    warn!(record_id = %r.id, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect())
    }

    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, the server's
    /// validation error, or [`ApiError::Decode`] if the stored record is not
    /// owned by the session's user.
    pub async fn add<E: Entry>(&self, session: &Session, entry: &E) -> Result<Record, ApiError> {
        let user_id = require_user(session)?;
        let path = format!("/api/records/{}", E::COLLECTION.as_str());
        let record: Record = self.api.send_json(Method::POST, &path, entry).await?;
        if record.user_id != user_id {
            return Err(ApiError::Decode(format!("record {} stored for another user", record.id)));
        }
        Ok(record)
    }

    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session; a 404 when
    /// the record does not exist or is not the user's.
    pub async fn delete(&self, session: &Session, collection: Collection, id: Uuid) -> Result<(), ApiError> {
        require_user(session)?;
        self.api
            .send_empty(Method::DELETE, &format!("/api/records/{}/{id}", collection.as_str()))
            .await
    }

    /// Plain-text health report for sharing.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, otherwise
    /// the request's failure.
    pub async fn report(&self, session: &Session) -> Result<String, ApiError> {
        require_user(session)?;
        self.api.get_text("/api/report").await
    }

    /// Delete every record of the session's user. Returns how many went.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, otherwise
    /// the request's failure.
    pub async fn reset(&self, session: &Session) -> Result<u64, ApiError> {
        require_user(session)?;
        let response: ResetResponse = self.api.call_json(Method::DELETE, "/api/account/data").await?;
        Ok(response.deleted)
    }

    /// Change the display name.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, otherwise
    /// the request's failure.
    pub async fn rename(&self, session: &Session, name: &str) -> Result<User, ApiError> {
        require_user(session)?;
        self.api
            .send_json(Method::PATCH, "/api/account/profile", &ProfileBody { name })
            .await
    }
}

#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
