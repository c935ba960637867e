//! Session manager: the single owner of "who is signed in".
//!
//! ARCHITECTURE
//! ============
//! The manager subscribes to the identity provider's auth-state stream and
//! runs a pump task that turns each provider event into a new `Session`
//! snapshot. Snapshots are replaced wholesale and re-published on a
//! [`Broadcast`], so the route guard and any screen observe the same ordered
//! sequence.
//!
//! The manager never mutates the session on its own. `sign_in`, `sign_up`
//! and `sign_out` delegate to the provider; the resulting state change
//! arrives through the stream like any other event. A failed sign-out
//! therefore leaves the session exactly as it was.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::events::{Broadcast, Subscription};
use crate::identity::{Credentials, Identity, IdentityError, IdentityProvider, Registration};

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// The provider has not reported yet.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Immutable snapshot of the current identity and its load state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
    display_name: Option<String>,
    status: SessionStatus,
}

impl Session {
    #[must_use]
    pub fn loading() -> Self {
        Self { user_id: None, display_name: None, status: SessionStatus::Loading }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { user_id: None, display_name: None, status: SessionStatus::Unauthenticated }
    }

    #[must_use]
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            user_id: Some(identity.user_id),
            display_name: Some(identity.display_name),
            status: SessionStatus::Authenticated,
        }
    }

    #[must_use]
    pub fn from_identity(identity: Option<Identity>) -> Self {
        identity.map_or_else(Self::unauthenticated, Self::authenticated)
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session manager was shut down")]
    Closed,
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    current: Arc<RwLock<Session>>,
    changes: Broadcast<Session>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Manager in `Loading`. Nothing happens until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            current: Arc::new(RwLock::new(Session::loading())),
            changes: Broadcast::with_latest(Session::loading()),
            pump: Mutex::new(None),
        }
    }

    /// Start observing the provider. Idempotent; must run inside a Tokio
    /// runtime.
    ///
    /// The subscription is taken before `restore` is requested, so the
    /// provider's first report cannot be missed.
    pub fn initialize(&self) {
        let mut pump = self.pump.lock().unwrap_or_else(PoisonError::into_inner);
        if pump.is_some() {
            return;
        }

        let events = self.provider.on_auth_state_changed();
        let provider = Arc::clone(&self.provider);
        let current = Arc::clone(&self.current);
        let changes = self.changes.clone();
        *pump = Some(tokio::spawn(async move {
            provider.restore().await;
            run_pump(events, &current, &changes).await;
        }));
    }

    /// Snapshot of the current session. Never waits on I/O.
    #[must_use]
    pub fn current(&self) -> Session {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Ordered session snapshots, starting with the current one.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<Session> {
        self.changes.subscribe()
    }

    /// # Errors
    ///
    /// Returns the provider's rejection. The session is unchanged.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<(), IdentityError> {
        self.provider.sign_in(credentials).await.inspect_err(|e| {
            warn!(error = %e, "sign-in failed");
        })
    }

    /// # Errors
    ///
    /// Returns the provider's rejection. The session is unchanged.
    pub async fn sign_up(&self, registration: Registration) -> Result<(), IdentityError> {
        self.provider.sign_up(registration).await.inspect_err(|e| {
            warn!(error = %e, "sign-up failed");
        })
    }

    /// Ask the provider to end the session. The status moves to
    /// `Unauthenticated` only when the provider confirms through its stream.
    ///
    /// # Errors
    ///
    /// Returns the provider's error. The session is unchanged.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        let user_id = self.current().user_id.unwrap_or_default();
        self.provider.sign_out().await.inspect_err(|e| {
            warn!(%user_id, error = %e, "sign-out failed; keeping session");
        })
    }

    /// Wait for the first session that satisfies `pred`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the manager shuts down first.
    pub async fn wait_until<F>(&self, pred: F) -> Result<Session, SessionError>
    where
        F: Fn(&Session) -> bool,
    {
        let mut sub = self.subscribe();
        while let Some(session) = sub.recv().await {
            if pred(&session) {
                return Ok(session);
            }
        }
        Err(SessionError::Closed)
    }

    /// Wait until the provider has reported at least once.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the manager shuts down first.
    pub async fn wait_until_ready(&self) -> Result<Session, SessionError> {
        self.wait_until(|s| s.status() != SessionStatus::Loading).await
    }

    /// Stop the pump, release the provider subscription and end every
    /// session subscription. The manager cannot be re-initialized.
    pub fn shutdown(&self) {
        if let Some(pump) = self.pump.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            pump.abort();
        }
        self.changes.close();
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.get_mut().unwrap_or_else(PoisonError::into_inner).take() {
            pump.abort();
        }
    }
}

async fn run_pump(mut events: Subscription<Option<Identity>>, current: &RwLock<Session>, changes: &Broadcast<Session>) {
    while let Some(identity) = events.recv().await {
        let next = Session::from_identity(identity);
        {
            let mut slot = current.write().unwrap_or_else(PoisonError::into_inner);
            if *slot == next {
                continue;
            }
            *slot = next.clone();
        }
        match next.user_id() {
            Some(user_id) => info!(%user_id, "session authenticated"),
            None => info!("session unauthenticated"),
        }
        changes.publish(next);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
