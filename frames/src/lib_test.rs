use super::*;

#[test]
fn credential_frame_encodes_as_single_api_key_field() {
    let frame = Credential::new("abc123").into_frame();
    assert_eq!(encode_outbound(&frame), r#"{"api_key":"abc123"}"#);
}

#[test]
fn command_frame_encodes_as_single_message_field() {
    assert_eq!(encode_outbound(&Outbound::command("hello")), r#"{"message":"hello"}"#);
}

#[test]
fn command_text_is_forwarded_verbatim() {
    let text = "  click \"OK\"\nthen wait ";
    let encoded = encode_outbound(&Outbound::command(text));
    let parsed: Value = serde_json::from_str(&encoded).expect("valid json");
    assert_eq!(parsed, serde_json::json!({ "message": text }));
}

#[test]
fn empty_command_is_not_rejected() {
    assert_eq!(encode_outbound(&Outbound::command("")), r#"{"message":""}"#);
}

#[test]
fn credential_debug_output_is_redacted() {
    let credential = Credential::new("super-secret");
    assert!(!format!("{credential:?}").contains("super-secret"));
    assert!(!format!("{:?}", credential.into_frame()).contains("super-secret"));
}

#[test]
fn command_debug_output_keeps_message() {
    assert!(format!("{:?}", Outbound::command("hi")).contains("hi"));
}

#[test]
fn decode_inbound_reads_type_tag() {
    let msg = decode_inbound(r#"{"type":"chat","text":"hi"}"#).expect("decode");
    assert_eq!(msg.kind(), Some("chat"));
    assert!(!msg.is_stream_url());
    assert_eq!(msg.get("text"), Some(&serde_json::json!("hi")));
}

#[test]
fn decode_inbound_keeps_every_field() {
    let text = r#"{"type":"stream_url","url":"x","extra":{"n":1}}"#;
    let msg = decode_inbound(text).expect("decode");
    assert_eq!(
        msg.as_value(),
        &serde_json::json!({"type":"stream_url","url":"x","extra":{"n":1}})
    );
}

#[test]
fn stream_url_message_exposes_url() {
    let msg = decode_inbound(r#"{"type":"stream_url","url":"https://example.test/s"}"#).expect("decode");
    assert!(msg.is_stream_url());
    assert_eq!(msg.stream_url(), Some("https://example.test/s"));
}

#[test]
fn stream_url_is_none_for_other_types() {
    let msg = decode_inbound(r#"{"type":"chat","url":"x"}"#).expect("decode");
    assert_eq!(msg.stream_url(), None);
}

#[test]
fn missing_type_is_accepted() {
    let msg = decode_inbound(r#"{"text":"no tag"}"#).expect("decode");
    assert_eq!(msg.kind(), None);
}

#[test]
fn non_string_type_has_no_kind() {
    let msg = decode_inbound(r#"{"type":7}"#).expect("decode");
    assert_eq!(msg.kind(), None);
    assert!(!msg.is_stream_url());
}

#[test]
fn decode_inbound_rejects_malformed_json() {
    let err = decode_inbound("{not json").expect_err("should fail");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_inbound_rejects_non_object_json() {
    for text in ["[1,2]", "\"stream_url\"", "42", "null"] {
        let err = decode_inbound(text).expect_err("should fail");
        assert!(matches!(err, CodecError::NotAnObject), "{text}");
    }
}

#[test]
fn decode_inbound_bytes_accepts_utf8_json() {
    let msg = decode_inbound_bytes(br#"{"type":"chat"}"#).expect("decode");
    assert_eq!(msg.kind(), Some("chat"));
}

#[test]
fn decode_inbound_bytes_rejects_invalid_utf8() {
    let err = decode_inbound_bytes(&[0xff, 0xfe, 0x7b]).expect_err("should fail");
    assert!(matches!(err, CodecError::Utf8(_)));
}

#[test]
fn inbound_message_serializes_transparently() {
    let msg = decode_inbound(r#"{"type":"chat","text":"hi"}"#).expect("decode");
    let json = serde_json::to_value(&msg).expect("serialize");
    assert_eq!(json, serde_json::json!({"type":"chat","text":"hi"}));
    assert_eq!(msg.to_string(), json.to_string());
}

#[test]
fn credential_from_env_ignores_unset_variable() {
    assert!(Credential::from_env("FRAMES_TEST_CREDENTIAL_THAT_IS_NEVER_SET").is_none());
}
