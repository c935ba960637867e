//! Health record service: per-user document collections.
//!
//! DESIGN
//! ======
//! Every entity (BP reading, medication, meal, symptom, journal entry) is a
//! JSON document in one `records` table, keyed by `(user_id, collection)`.
//! Typed entry structs validate and normalize a body before it is stored, so
//! readers can decode documents back into the same structs.
//!
//! DATA ISOLATION
//! ==============
//! `RecordQuery` cannot be built without a `user_id`, and every store method
//! filters on it. Deleting another user's record reports `NotFound`, never
//! `Forbidden`, so ids do not leak across accounts.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

/// Systolic/diastolic pair above which the emergency guidance applies.
pub const CRISIS_SYSTOLIC: u16 = 180;
pub const CRISIS_DIASTOLIC: u16 = 120;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("malformed record body: {0}")]
    Malformed(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
    #[error("record not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Named document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    BpReadings,
    Medications,
    FoodLogs,
    Symptoms,
    Journal,
}

impl Collection {
    pub const ALL: [Self; 5] = [Self::BpReadings, Self::Medications, Self::FoodLogs, Self::Symptoms, Self::Journal];

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

    /// Parse the URL/storage name of a collection.
    ///
    /// # Errors
    ///
    /// `UnknownCollection` for any other string.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == raw)
            .ok_or_else(|| RecordError::UnknownCollection(raw.to_owned()))
    }
}

// =============================================================================
// ENTRY TYPES
// =============================================================================

/// A typed document body bound to one collection.
pub trait Entry: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Check required fields and ranges, returning the normalized entry.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` or `OutOfRange` describing the first violation.
    fn validate(self) -> Result<Self, RecordError>;
}

fn required(value: &str, field: &'static str) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpReading {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BpReading {
    /// True when either number crosses the hypertensive-crisis threshold.
    #[must_use]
    pub fn is_crisis(&self) -> bool {
        self.systolic > CRISIS_SYSTOLIC || self.diastolic > CRISIS_DIASTOLIC
    }
}

impl Entry for BpReading {
    const COLLECTION: Collection = Collection::BpReadings;

    fn validate(self) -> Result<Self, RecordError> {
        if !(50..=300).contains(&self.systolic) {
            return Err(RecordError::OutOfRange("systolic"));
        }
        if !(30..=200).contains(&self.diastolic) {
            return Err(RecordError::OutOfRange("diastolic"));
        }
        if self.systolic <= self.diastolic {
            return Err(RecordError::OutOfRange("systolic must exceed diastolic"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub reminder: bool,
}

impl Entry for Medication {
    const COLLECTION: Collection = Collection::Medications;

    fn validate(self) -> Result<Self, RecordError> {
        Ok(Self {
            name: required(&self.name, "name")?,
            dosage: self.dosage.trim().to_owned(),
            instructions: self.instructions.trim().to_owned(),
            reminder: self.reminder,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodLog {
    pub meal: String,
    #[serde(default)]
    pub description: String,
}

impl Entry for FoodLog {
    const COLLECTION: Collection = Collection::FoodLogs;

    fn validate(self) -> Result<Self, RecordError> {
        Ok(Self { meal: required(&self.meal, "meal")?, description: self.description.trim().to_owned() })
    }
}

fn default_severity() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomLog {
    pub symptom: String,
    #[serde(default = "default_severity")]
    pub severity: u8,
    #[serde(default)]
    pub notes: String,
}

impl Entry for SymptomLog {
    const COLLECTION: Collection = Collection::Symptoms;

    fn validate(self) -> Result<Self, RecordError> {
        if !(1..=5).contains(&self.severity) {
            return Err(RecordError::OutOfRange("severity"));
        }
        Ok(Self { symptom: required(&self.symptom, "symptom")?, severity: self.severity, notes: self.notes.trim().to_owned() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
}

impl Entry for JournalEntry {
    const COLLECTION: Collection = Collection::Journal;

    fn validate(self) -> Result<Self, RecordError> {
        Ok(Self { text: required(&self.text, "text")? })
    }
}

fn normalize<E: Entry>(body: Value) -> Result<Value, RecordError> {
    let entry: E = serde_json::from_value(body).map_err(|e| RecordError::Malformed(e.to_string()))?;
    let entry = entry.validate()?;
    serde_json::to_value(entry).map_err(|e| RecordError::Malformed(e.to_string()))
}

/// Validate a raw body against the collection's entry type.
///
/// # Errors
///
/// `Malformed` when the JSON does not fit the entry shape, otherwise the
/// entry's own validation error.
pub fn validate_body(collection: Collection, body: Value) -> Result<Value, RecordError> {
    match collection {
        Collection::BpReadings => normalize::<BpReading>(body),
        Collection::Medications => normalize::<Medication>(body),
        Collection::FoodLogs => normalize::<FoodLog>(body),
        Collection::Symptoms => normalize::<SymptomLog>(body),
        Collection::Journal => normalize::<JournalEntry>(body),
    }
}

// =============================================================================
// RECORDS + QUERIES
// =============================================================================

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: Uuid,
    pub user_id: Uuid,
    pub collection: Collection,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
    pub body: Value,
}

impl Record {
    /// Decode the body as `E`. `None` if the record belongs to another
    /// collection or no longer fits the type.
    #[must_use]
    pub fn decode<E: Entry>(&self) -> Option<E> {
        if self.collection != E::COLLECTION {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }
}

/// `(collection, user_id = ?, ORDER BY recorded_at DESC, LIMIT n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordQuery {
    pub collection: Collection,
    pub user_id: Uuid,
    pub limit: i64,
}

impl RecordQuery {
    #[must_use]
    pub fn new(collection: Collection, user_id: Uuid) -> Self {
        Self { collection, user_id, limit: DEFAULT_LIST_LIMIT }
    }

    /// Override the page size, clamped to `1..=MAX_LIST_LIMIT`.
    #[must_use]
    pub fn limit(mut self, limit: Option<i64>) -> Self {
        if let Some(n) = limit {
            self.limit = n.clamp(1, MAX_LIST_LIMIT);
        }
        self
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Document store scoped by user. Enables in-memory stores in tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store an already-validated body.
    async fn insert(&self, user_id: Uuid, collection: Collection, body: Value) -> Result<Record, RecordError>;

    /// Newest-first records matching the query.
    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>, RecordError>;

    /// Delete one record owned by `user_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no such record exists for this user.
    async fn delete(&self, user_id: Uuid, collection: Collection, id: Uuid) -> Result<(), RecordError>;

    /// Delete every record owned by `user_id`. Returns the count removed.
    async fn clear_user(&self, user_id: Uuid) -> Result<u64, RecordError>;
}

/// Validate and store a raw body for `user_id`.
pub async fn create_record(
    store: &dyn RecordStore,
    user_id: Uuid,
    collection: Collection,
    body: Value,
) -> Result<Record, RecordError> {
    let body = validate_body(collection, body)?;
    store.insert(user_id, collection, body).await
}

/// Newest `limit` entries of type `E` for `user_id`, with their records.
pub async fn recent<E: Entry>(
    store: &dyn RecordStore,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<(Record, E)>, RecordError> {
    let query = RecordQuery::new(E::COLLECTION, user_id).limit(Some(limit));
    let records = store.query(&query).await?;
    Ok(records
        .into_iter()
        .filter_map(|r| r.decode::<E>().map(|e| (r, e)))
        .collect())
}

/// Postgres-backed store.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, user_id: Uuid, collection: Collection, body: Value) -> Result<Record, RecordError> {
        let row = sqlx::query(
            r"INSERT INTO records (user_id, collection, body)
              VALUES ($1, $2, $3)
              RETURNING id, recorded_at",
        )
        .bind(user_id)
        .bind(collection.as_str())
        .bind(&body)
        .fetch_one(&self.pool)
        .await?;

        Ok(Record { id: row.get("id"), user_id, collection, recorded_at: row.get("recorded_at"), body })
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>, RecordError> {
        let rows = sqlx::query(
            r"SELECT id, recorded_at, body
              FROM records
              WHERE user_id = $1 AND collection = $2
              ORDER BY recorded_at DESC, id DESC
              LIMIT $3",
        )
        .bind(query.user_id)
        .bind(query.collection.as_str())
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Record {
                id: r.get("id"),
                user_id: query.user_id,
                collection: query.collection,
                recorded_at: r.get("recorded_at"),
                body: r.get("body"),
            })
            .collect())
    }

    async fn delete(&self, user_id: Uuid, collection: Collection, id: Uuid) -> Result<(), RecordError> {
        let result = sqlx::query("DELETE FROM records WHERE id = $1 AND user_id = $2 AND collection = $3")
            .bind(id)
            .bind(user_id)
            .bind(collection.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound(id));
        }
        Ok(())
    }

    async fn clear_user(&self, user_id: Uuid) -> Result<u64, RecordError> {
        let result = sqlx::query("DELETE FROM records WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// IN-MEMORY STORE (tests)
// =============================================================================


#[cfg(test)]
#[path = "records_test.rs"]
mod tests;
