//! REST API client for communicating with the server.
//!
//! ERROR HANDLING
//! ==============
//! Every call is attempted once. Transport failures, non-2xx statuses and
//! undecodable bodies come back as distinct `ApiError` variants so callers
//! can decide whether to fall back (records, assistant) or surface the error
//! (identity).

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the raw text.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = value.get("error").and_then(Value::as_str) {
            return msg.to_owned();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() { format!("HTTP {status}") } else { trimmed.to_owned() }
}

/// HTTP client bound to one server. Clones share the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if reqwest cannot build a client.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), token: Arc::new(RwLock::new(None)) })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String, ApiError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(ApiError::Status { status, message: error_message(status, &text) });
        }
        Ok(text)
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call_json(Method::GET, path).await
    }

    /// Bodiless request with a JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn call_json<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        let text = self.send(method, path, None).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_text(&self, path: &str) -> Result<String, ApiError> {
        self.send(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let text = self.send(method, path, Some(&body)).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Request whose response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.send(method, path, None).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
