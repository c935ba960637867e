//! Health assistant chat and daily tip.
//!
//! The server already falls back when the model is unavailable. This side
//! only has to cover the case where the server itself cannot be reached.

use reqwest::Method;
use serde::Serialize;
use tracing::warn;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::AssistantReply;
use crate::session::Session;

pub const NETWORK_FALLBACK: &str = "Network error. Please check your internet connection.";

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
}

#[derive(Clone)]
pub struct Assistant {
    api: ApiClient,
}

impl Assistant {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ask a question. Transport failures become [`NETWORK_FALLBACK`].
    ///
    /// # Errors
    ///
    /// [`ApiError::NotAuthenticated`] for a signed-out session, and any
    /// non-network error the server reports (blank message, rate limit).
    pub async fn ask(&self, session: &Session, message: &str) -> Result<AssistantReply, ApiError> {
        if !session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let result = self
            .api
            .send_json(Method::POST, "/api/assistant/chat", &ChatBody { message })
            .await;
        recover_network(result)
    }

    /// Tip based on the user's recent readings.
    ///
    /// # Errors
    ///
    /// As for [`ask`](Self::ask).
    pub async fn tip(&self, session: &Session) -> Result<AssistantReply, ApiError> {
        if !session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        recover_network(self.api.get_json("/api/assistant/tip").await)
    }
}

fn recover_network(result: Result<AssistantReply, ApiError>) -> Result<AssistantReply, ApiError> {
    match result {
        Err(ApiError::Network(e)) => {
            warn!(error = %e, "assistant unreachable");
            Ok(AssistantReply { text: NETWORK_FALLBACK.to_owned(), source: "offline".to_owned() })
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
