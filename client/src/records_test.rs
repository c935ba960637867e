use serde_json::json;
use time::OffsetDateTime;

use super::*;
use crate::identity::Identity;

const UNREACHABLE: &str = "http://127.0.0.1:9";

fn record(user_id: &str) -> Record {
    Record {
        id: Uuid::new_v4(),
        user_id: user_id.to_owned(),
        collection: "journal".into(),
        recorded_at: OffsetDateTime::UNIX_EPOCH,
        body: json!({"text": "note"}),
    }
}

fn signed_in(user_id: &str) -> Session {
    Session::authenticated(Identity { user_id: user_id.to_owned(), display_name: "Ada".into() })
}

fn records() -> Records {
    Records::new(ApiClient::new(UNREACHABLE).unwrap())
}

#[test]
fn retain_owned_drops_foreign_records() {
    let mine = record("u1");
    let kept = retain_owned("u1", vec![mine.clone(), record("u2"), record("u3")]);
    assert_eq!(kept, vec![mine]);
}

#[test]
fn entries_map_to_server_collections() {
    assert_eq!(BpEntry::COLLECTION.as_str(), "bp_readings");
    assert_eq!(MedicationEntry::COLLECTION.as_str(), "medications");
    assert_eq!(FoodEntry::COLLECTION.as_str(), "food_logs");
    assert_eq!(SymptomEntry::COLLECTION.as_str(), "symptoms");
    assert_eq!(JournalEntry::COLLECTION.as_str(), "journal");
}

#[test]
fn entry_bodies_fill_server_defaults() {
    let symptom: SymptomEntry = serde_json::from_value(json!({"symptom": "Headache"})).unwrap();
    assert_eq!(symptom.severity, 1);
    let med: MedicationEntry = serde_json::from_value(json!({"name": "Amlodipine"})).unwrap();
    assert!(!med.reminder);
}

#[test]
fn crisis_threshold_matches_emergency_rule() {
    assert!(BpEntry { systolic: 181, diastolic: 90 }.is_crisis());
    assert!(BpEntry { systolic: 150, diastolic: 121 }.is_crisis());
    assert!(!BpEntry { systolic: 180, diastolic: 120 }.is_crisis());
}

#[tokio::test]
async fn signed_out_session_never_reaches_the_network() {
    let records = records();
    for session in [Session::loading(), Session::unauthenticated()] {
        let err = records.list(&session, Collection::Journal, None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        let err = records.add(&session, &JournalEntry { text: "hi".into() }).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
        assert!(matches!(records.report(&session).await, Err(ApiError::NotAuthenticated)));
        assert!(matches!(records.reset(&session).await, Err(ApiError::NotAuthenticated)));
    }
}

#[tokio::test]
async fn list_or_empty_falls_back_on_storage_failure() {
    let list = records().list_or_empty(&signed_in("u1"), Collection::BpReadings, Some(5)).await;
    assert!(list.is_empty());
}
