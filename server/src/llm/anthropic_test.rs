use super::*;

#[test]
fn parse_text_response() {
    let json = r#"{
        "content": [{"type": "text", "text": "Sit quietly and re-test."}],
        "model": "claude-haiku-4-5",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 7}
    }"#;
    let resp = parse_response(json).unwrap();
    assert_eq!(resp.text, "Sit quietly and re-test.");
    assert_eq!(resp.model, "claude-haiku-4-5");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 12);
    assert_eq!(resp.output_tokens, 7);
}

#[test]
fn parse_joins_text_blocks_and_skips_others() {
    let json = r#"{
        "content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "Drink water. "},
            {"type": "text", "text": "Rest."}
        ],
        "model": "m",
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 1, "output_tokens": 1}
    }"#;
    assert_eq!(parse_response(json).unwrap().text, "Drink water. Rest.");
}

#[test]
fn parse_missing_stop_reason_defaults() {
    let json = r#"{"content": [], "model": "m", "usage": {"input_tokens": 0, "output_tokens": 0}}"#;
    let resp = parse_response(json).unwrap();
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.text, "");
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_serializes_plain_messages() {
    let messages = vec![Message::user("hi")];
    let body = ApiRequest { model: "m", max_tokens: 64, system: "sys", messages: &messages };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["messages"][0]["content"], "hi");
    assert_eq!(json["system"], "sys");
    assert_eq!(json["max_tokens"], 64);
}
