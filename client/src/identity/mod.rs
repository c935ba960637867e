//! Identity provider seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager never talks to the network directly. It drives an
//! `IdentityProvider` and learns the outcome only from the provider's
//! auth-state stream, so sign-in, sign-up, sign-out and restore all converge
//! on the same code path.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::events::Subscription;
use crate::net::api::ApiError;

/// Who the provider says is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl From<ApiError> for IdentityError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Status { status, message } if (400..500).contains(&status) => Self::Rejected(message),
            other => Self::Protocol(other.to_string()),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, IdentityError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

/// Email and password for signing in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingField`] for a blank email or password.
    pub fn new(email: &str, password: &str) -> Result<Self, IdentityError> {
        let email = required(email, "email")?;
        if password.is_empty() {
            return Err(IdentityError::MissingField("password"));
        }
        Ok(Self { email, password: password.to_owned() })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up form.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub credentials: Credentials,
}

impl Registration {
    /// # Errors
    ///
    /// Returns [`IdentityError::MissingField`] for any blank field.
    pub fn new(name: &str, email: &str, password: &str) -> Result<Self, IdentityError> {
        let name = required(name, "name")?;
        Ok(Self { name, credentials: Credentials::new(email, password)? })
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// External authentication service.
///
/// Implementations emit on `on_auth_state_changed` at least once after
/// `restore` and at most once per actual transition.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns the provider's rejection or transport failure.
    async fn sign_in(&self, credentials: Credentials) -> Result<(), IdentityError>;

    /// # Errors
    ///
    /// Returns the provider's rejection or transport failure.
    async fn sign_up(&self, registration: Registration) -> Result<(), IdentityError>;

    /// Invalidate the current session. Local state must not change unless
    /// the provider confirms.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection or transport failure.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Report any persisted session. Always ends with an emission; failures
    /// are reported as `None`.
    async fn restore(&self);

    fn on_auth_state_changed(&self) -> Subscription<Option<Identity>>;
}

// =============================================================================
// TEST PROVIDER
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
