use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use uuid::Uuid;

use super::*;
use crate::llm::LlmChat;
use crate::llm::types::{ChatResponse, LlmError, Message};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::assistant::ReplySource;
use crate::services::session::SessionUser;
use crate::state::test_helpers;

struct CannedLlm(&'static str);

#[async_trait::async_trait]
impl LlmChat for CannedLlm {
    async fn chat(&self, _max_tokens: u32, _system: &str, _messages: &[Message]) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            text: self.0.to_owned(),
            model: "canned".into(),
            stop_reason: "stop".into(),
            input_tokens: 1,
            output_tokens: 1,
        })
    }
}

fn auth_for(id: Uuid) -> AuthUser {
    AuthUser {
        user: SessionUser { id, name: "Test".into(), email: format!("{id}@example.com") },
        token: "test-token".into(),
    }
}

fn body(message: &str) -> Json<ChatBody> {
    Json(ChatBody { message: message.into() })
}

#[tokio::test]
async fn chat_returns_model_reply() {
    let (state, _) = test_helpers::test_app_state_with_llm(Arc::new(CannedLlm("Drink water.")));
    let Json(reply) = chat(State(state), auth_for(Uuid::new_v4()), body("Any tips?")).await.unwrap();
    assert_eq!(reply.text, "Drink water.");
    assert_eq!(reply.source, ReplySource::Model);
}

#[tokio::test]
async fn chat_without_llm_answers_offline() {
    let (state, _) = test_helpers::test_app_state();
    let Json(reply) = chat(State(state), auth_for(Uuid::new_v4()), body("I have a headache")).await.unwrap();
    assert_eq!(reply.source, ReplySource::Offline);
}

#[tokio::test]
async fn blank_message_is_bad_request() {
    let (state, _) = test_helpers::test_app_state();
    let err = chat(State(state), auth_for(Uuid::new_v4()), body("   ")).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_over_limit_is_too_many_requests() {
    let (mut state, _) = test_helpers::test_app_state_with_llm(Arc::new(CannedLlm("ok")));
    state.rate_limiter = RateLimiter::with_config(RateLimitConfig {
        per_user_limit: 1,
        per_user_window: Duration::from_secs(60),
        global_limit: 100,
        global_window: Duration::from_secs(60),
    });
    let user = Uuid::new_v4();
    chat(State(state.clone()), auth_for(user), body("first")).await.unwrap();
    let err = chat(State(state), auth_for(user), body("second")).await.unwrap_err();
    assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn tip_uses_model_when_available() {
    let (state, _) = test_helpers::test_app_state_with_llm(Arc::new(CannedLlm("Walk after dinner.")));
    let Json(reply) = tip(State(state), auth_for(Uuid::new_v4())).await.unwrap();
    assert_eq!(reply.text, "Walk after dinner.");
}
