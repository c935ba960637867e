use super::*;

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Ada@Example.COM "), Some("ada@example.com".into()));
}

#[test]
fn normalize_email_rejects_missing_at() {
    assert_eq!(normalize_email("ada.example.com"), None);
}

#[test]
fn normalize_email_rejects_empty_parts() {
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("ada@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

// =============================================================================
// normalize_name
// =============================================================================

#[test]
fn normalize_name_trims() {
    assert_eq!(normalize_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
}

#[test]
fn normalize_name_blank_is_missing() {
    assert!(matches!(normalize_name("   "), Err(AccountError::MissingField("name"))));
}

#[test]
fn normalize_name_too_long() {
    let long = "x".repeat(MAX_NAME_LEN + 1);
    assert!(matches!(normalize_name(&long), Err(AccountError::NameTooLong)));
}

// =============================================================================
// NewAccount::parse
// =============================================================================

#[test]
fn parse_accepts_complete_fields() {
    let account = NewAccount::parse("Ada", "ADA@example.com", "secret1").unwrap();
    assert_eq!(account.name, "Ada");
    assert_eq!(account.email, "ada@example.com");
    assert_eq!(account.password, "secret1");
}

#[test]
fn parse_requires_name() {
    assert!(matches!(NewAccount::parse("", "a@b.c", "secret1"), Err(AccountError::MissingField("name"))));
}

#[test]
fn parse_requires_email() {
    assert!(matches!(NewAccount::parse("Ada", " ", "secret1"), Err(AccountError::MissingField("email"))));
}

#[test]
fn parse_rejects_malformed_email() {
    assert!(matches!(NewAccount::parse("Ada", "nope", "secret1"), Err(AccountError::InvalidEmail)));
}

#[test]
fn parse_requires_password() {
    assert!(matches!(NewAccount::parse("Ada", "a@b.c", ""), Err(AccountError::MissingField("password"))));
}

#[test]
fn parse_rejects_short_password() {
    assert!(matches!(NewAccount::parse("Ada", "a@b.c", "12345"), Err(AccountError::WeakPassword)));
}

// =============================================================================
// password hashing
// =============================================================================

#[test]
fn hash_then_verify_accepts_same_password() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash));
}

#[test]
fn verify_rejects_wrong_password() {
    let hash = hash_password("correct horse").unwrap();
    assert!(!verify_password("battery staple", &hash));
}

#[test]
fn verify_rejects_garbage_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
}

#[test]
fn hashes_are_salted() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
}
