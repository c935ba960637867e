//! Assistant service: hypertension chat replies and daily tips.
//!
//! DESIGN
//! ======
//! Text generation fails open. With an LLM configured, replies come from the
//! model and any LLM error yields a fixed apology. Without one, a small
//! keyword table answers the common questions so the chat screen still
//! works offline. Rate limits apply only to requests that reach the model.

use std::fmt::Write;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::records::{self, BpReading, RecordError, RecordStore};
use crate::llm::LlmChat;
use crate::llm::types::Message;
use crate::rate_limit::{RateLimitError, RateLimiter};

pub const SYSTEM_PROMPT: &str =
    "You are an empathetic medical assistant helping a patient manage hypertension. Be brief, encouraging, and clear.";
pub const LLM_FALLBACK: &str = "I'm having trouble connecting to my brain right now. Please try again.";
pub const MAX_MESSAGE_LEN: usize = 2000;
pub const TIP_READING_LIMIT: i64 = 3;

const DEFAULT_ASSISTANT_MAX_TOKENS: u32 = 512;

const STATIC_TIPS: [&str; 3] = [
    "Aim for less than 2,300mg of sodium per day.",
    "Just 30 mins of walking can lower your BP significantly.",
    "Caffeine can cause a short, but dramatic BP spike.",
];
const CRISIS_TIP: &str = "Your last reading was very high. Sit quietly for 5 minutes and re-test. If it remains over 180/120, contact a doctor immediately.";

fn assistant_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| {
        std::env::var("ASSISTANT_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ASSISTANT_MAX_TOKENS)
    })
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("message exceeds {MAX_MESSAGE_LEN} characters")]
    MessageTooLong,
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error(transparent)]
    Records(#[from] RecordError),
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Model,
    Fallback,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub source: ReplySource,
}

impl AssistantReply {
    fn new(text: impl Into<String>, source: ReplySource) -> Self {
        Self { text: text.into(), source }
    }
}

// =============================================================================
// OFFLINE REPLIES
// =============================================================================

/// Keyword reply used when no LLM is configured.
#[must_use]
pub fn offline_reply(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if lower.contains("high") {
        "If your reading is high, please sit quietly for 5 minutes and re-test. If it remains over 180/120, contact a doctor immediately."
    } else if lower.contains("headache") || lower.contains("dizzy") {
        "Dizziness or headaches can be symptoms of BP changes. Please check your reading now."
    } else if lower.contains("food") || lower.contains("eat") {
        "Try to avoid salty foods. Fruits and vegetables are great for keeping BP stable!"
    } else {
        "I see. Remember to take your medication and stay hydrated."
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Answer one chat message.
///
/// # Errors
///
/// Rejects empty or oversized messages and requests over the rate limit.
/// LLM failures are not errors; they produce [`LLM_FALLBACK`].
pub async fn chat(
    llm: Option<&dyn LlmChat>,
    limiter: &RateLimiter,
    user_id: Uuid,
    message: &str,
) -> Result<AssistantReply, AssistantError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AssistantError::EmptyMessage);
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AssistantError::MessageTooLong);
    }

    let Some(llm) = llm else {
        return Ok(AssistantReply::new(offline_reply(message), ReplySource::Offline));
    };

    limiter.check_and_record(user_id)?;
    Ok(generate(llm, user_id, message).await)
}

async fn generate(llm: &dyn LlmChat, user_id: Uuid, prompt: &str) -> AssistantReply {
    match llm.chat(assistant_max_tokens(), SYSTEM_PROMPT, &[Message::user(prompt)]).await {
        Ok(resp) if !resp.text.trim().is_empty() => {
            info!(
                %user_id,
                model = %resp.model,
                input_tokens = resp.input_tokens,
                output_tokens = resp.output_tokens,
                "assistant: model reply"
            );
            AssistantReply::new(resp.text.trim(), ReplySource::Model)
        }
        Ok(_) => {
            warn!(%user_id, "assistant: model returned empty reply");
            AssistantReply::new(LLM_FALLBACK, ReplySource::Fallback)
        }
        Err(e) => {
            warn!(%user_id, error = %e, "assistant: llm call failed");
            AssistantReply::new(LLM_FALLBACK, ReplySource::Fallback)
        }
    }
}

// =============================================================================
// TIPS
// =============================================================================

/// Prompt asking for one tip grounded in the user's latest readings.
#[must_use]
pub fn tip_prompt(readings: &[BpReading]) -> String {
    let mut out = String::from("Give me one short, practical tip for managing my blood pressure today.");
    if readings.is_empty() {
        out.push_str(" I have not logged any readings yet.");
    } else {
        out.push_str(" My most recent readings, newest first:");
        for r in readings {
            let _ = write!(out, " {}/{} mmHg;", r.systolic, r.diastolic);
        }
    }
    out
}

/// Tip used when the model is unavailable.
#[must_use]
pub fn static_tip(readings: &[BpReading]) -> &'static str {
    match readings.first() {
        Some(latest) if latest.is_crisis() => CRISIS_TIP,
        _ => STATIC_TIPS[readings.len() % STATIC_TIPS.len()],
    }
}

/// Produce a tip for the user.
///
/// # Errors
///
/// Returns [`AssistantError::Records`] if readings cannot be loaded and
/// [`AssistantError::RateLimited`] when the model quota is exhausted.
pub async fn tip(
    llm: Option<&dyn LlmChat>,
    limiter: &RateLimiter,
    store: &dyn RecordStore,
    user_id: Uuid,
) -> Result<AssistantReply, AssistantError> {
    let readings: Vec<BpReading> = records::recent::<BpReading>(store, user_id, TIP_READING_LIMIT)
        .await?
        .into_iter()
        .map(|(_, r)| r)
        .collect();

    let Some(llm) = llm else {
        return Ok(AssistantReply::new(static_tip(&readings), ReplySource::Offline));
    };

    limiter.check_and_record(user_id)?;
    let reply = generate(llm, user_id, &tip_prompt(&readings)).await;
    if reply.source == ReplySource::Fallback {
        return Ok(AssistantReply::new(static_tip(&readings), ReplySource::Fallback));
    }
    Ok(reply)
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
