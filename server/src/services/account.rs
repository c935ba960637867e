//! Account service: sign-up, credential check, profile rename.
//!
//! DESIGN
//! ======
//! Passwords are hashed with Argon2 (PHC string format) on a blocking thread
//! so request handling never stalls the runtime. Credential failures return a
//! single `InvalidCredentials` variant regardless of which half was wrong.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::session::SessionUser;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 80;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("name must be at most {MAX_NAME_LEN} characters")]
    NameTooLong,
    #[error("an account already exists for this email")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found: {0}")]
    NotFound(Uuid),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    /// Validate raw sign-up fields. Every field is required.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn parse(name: &str, email: &str, password: &str) -> Result<Self, AccountError> {
        let name = normalize_name(name)?;
        if email.trim().is_empty() {
            return Err(AccountError::MissingField("email"));
        }
        let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
        if password.is_empty() {
            return Err(AccountError::MissingField("password"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword);
        }
        Ok(Self { name, email, password: password.to_owned() })
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

/// Trim a display name and enforce presence and length.
///
/// # Errors
///
/// `MissingField("name")` for blank input, `NameTooLong` past the limit.
pub fn normalize_name(name: &str) -> Result<String, AccountError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AccountError::MissingField("name"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AccountError::NameTooLong);
    }
    Ok(trimmed.to_owned())
}

fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

async fn hash_password_blocking(password: String) -> Result<String, AccountError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
}

async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AccountError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

/// Insert a new user. Fails with `EmailTaken` on a duplicate email.
pub async fn create_account(pool: &PgPool, account: &NewAccount) -> Result<SessionUser, AccountError> {
    let password_hash = hash_password_blocking(account.password.clone()).await?;
    let row = sqlx::query(
        r"INSERT INTO users (name, email, password_hash)
          VALUES ($1, $2, $3)
          RETURNING id",
    )
    .bind(&account.name)
    .bind(&account.email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AccountError::EmailTaken,
        other => AccountError::Db(other),
    })?;

    Ok(SessionUser { id: row.get("id"), name: account.name.clone(), email: account.email.clone() })
}

/// Check an email/password pair and return the matching user.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<SessionUser, AccountError> {
    if email.trim().is_empty() {
        return Err(AccountError::MissingField("email"));
    }
    if password.is_empty() {
        return Err(AccountError::MissingField("password"));
    }
    let email = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;

    let row = sqlx::query("SELECT id, name, email, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::InvalidCredentials)?;

    let stored_hash: String = row.get("password_hash");
    if !verify_password_blocking(password.to_owned(), stored_hash).await? {
        return Err(AccountError::InvalidCredentials);
    }

    Ok(SessionUser { id: row.get("id"), name: row.get("name"), email: row.get("email") })
}

/// Change a user's display name.
pub async fn rename(pool: &PgPool, user_id: Uuid, name: &str) -> Result<SessionUser, AccountError> {
    let name = normalize_name(name)?;
    let row = sqlx::query("UPDATE users SET name = $2 WHERE id = $1 RETURNING id, name, email")
        .bind(user_id)
        .bind(&name)
        .fetch_optional(pool)
        .await?
        .ok_or(AccountError::NotFound(user_id))?;

    Ok(SessionUser { id: row.get("id"), name: row.get("name"), email: row.get("email") })
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
