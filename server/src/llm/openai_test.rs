use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Keep salt under 2,300mg." },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "Keep salt under 2,300mg.");
    assert_eq!(resp.model, "gpt-4o-mini");
    assert_eq!(resp.stop_reason, "stop");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn parse_null_content_is_empty_text() {
    let json = serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, "");
    assert_eq!(resp.stop_reason, "length");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o-mini", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_chat_completions_response("<html>"), Err(LlmError::ApiParse(_))));
}

#[test]
fn system_prompt_leads_messages() {
    let messages = vec![Message::user("hello")];
    let built = build_chat_completions_messages("Be brief.", &messages);
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].role, "system");
    assert_eq!(built[0].content, "Be brief.");
    assert_eq!(built[1].role, "user");
}

#[test]
fn blank_system_prompt_is_omitted() {
    let messages = vec![Message::user("hello")];
    let built = build_chat_completions_messages("  ", &messages);
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].content, "hello");
}
