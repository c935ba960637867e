//! Identity provider backed by the HyperTrack server.
//!
//! The bearer token lives in the shared [`ApiClient`] and, when a
//! [`TokenFile`] is configured, on disk so `restore` can pick the session up
//! on the next launch. Auth-state events are only published when the
//! signed-in identity actually changes.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::{info, warn};

use super::{Credentials, Identity, IdentityError, IdentityProvider, Registration};
use crate::events::{Broadcast, Subscription};
use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{AuthResponse, User};
use crate::token_store::TokenFile;

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self { user_id: user.id, display_name: user.name }
    }
}

pub struct HttpIdentityProvider {
    api: ApiClient,
    tokens: Option<TokenFile>,
    events: Broadcast<Option<Identity>>,
}

impl HttpIdentityProvider {
    #[must_use]
    pub fn new(api: ApiClient, tokens: Option<TokenFile>) -> Self {
        Self { api, tokens, events: Broadcast::new() }
    }

    /// The client carrying this provider's bearer token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn adopt(&self, response: AuthResponse) {
        self.api.set_token(Some(response.token.clone()));
        if let Some(tokens) = &self.tokens {
            if let Err(e) = tokens.save(&response.token).await {
                warn!(error = %e, path = %tokens.path().display(), "failed to persist session token");
            }
        }
        info!(user_id = %response.user.id, "signed in");
        self.events.publish_changed(Some(response.user.into()));
    }

    async fn forget(&self) {
        self.api.set_token(None);
        if let Some(tokens) = &self.tokens {
            if let Err(e) = tokens.clear().await {
                warn!(error = %e, path = %tokens.path().display(), "failed to remove session token");
            }
        }
        self.events.publish_changed(None);
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, credentials: Credentials) -> Result<(), IdentityError> {
        let body = LoginBody { email: &credentials.email, password: &credentials.password };
        let response: AuthResponse = self.api.send_json(Method::POST, "/api/auth/login", &body).await?;
        self.adopt(response).await;
        Ok(())
    }

    async fn sign_up(&self, registration: Registration) -> Result<(), IdentityError> {
        let body = SignupBody {
            name: &registration.name,
            email: &registration.credentials.email,
            password: &registration.credentials.password,
        };
        let response: AuthResponse = self.api.send_json(Method::POST, "/api/auth/signup", &body).await?;
        self.adopt(response).await;
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if self.api.token().is_some() {
            match self.api.send_empty(Method::POST, "/api/auth/logout").await {
                // Already invalid on the server: nothing left to revoke.
                Ok(()) | Err(ApiError::Status { status: 401, .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.forget().await;
        info!("signed out");
        Ok(())
    }

    async fn restore(&self) {
        let saved = match &self.tokens {
            Some(tokens) => tokens.load().await.unwrap_or_else(|e| {
                warn!(error = %e, path = %tokens.path().display(), "failed to read session token");
                None
            }),
            None => None,
        };
        let Some(token) = saved.or_else(|| self.api.token()) else {
            self.events.publish_changed(None);
            return;
        };

        self.api.set_token(Some(token));
        match self.api.get_json::<User>("/api/auth/me").await {
            Ok(user) => {
                self.events.publish_changed(Some(user.into()));
            }
            Err(ApiError::Status { status: 401, .. }) => {
                info!("saved session expired");
                self.forget().await;
            }
            Err(e) => {
                // Keep the file: the session may still be valid once the
                // server is reachable again.
                warn!(error = %e, "could not restore session");
                self.api.set_token(None);
                self.events.publish_changed(None);
            }
        }
    }

    fn on_auth_state_changed(&self) -> Subscription<Option<Identity>> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
