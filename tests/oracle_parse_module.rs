use appseed::oracle::{parse_chat_completion, OracleError};
use serde_json::json;

#[test]
fn extracts_and_trims_the_first_choice_content() {
    let body = json!({
        "choices": [
            {"message": {"role": "assistant", "content": "  generated text  "}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ]
    });
    assert_eq!(parse_chat_completion(&body).expect("content"), "generated text");
}

#[test]
fn api_error_envelope_becomes_a_typed_error() {
    let body = json!({"error": {"message": "invalid api key", "type": "auth"}});
    match parse_chat_completion(&body) {
        Err(OracleError::Api(message)) => assert!(message.contains("invalid api key")),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[test]
fn empty_choices_is_a_completion_error() {
    let body = json!({"choices": []});
    assert!(matches!(
        parse_chat_completion(&body),
        Err(OracleError::Completion(_))
    ));
}

#[test]
fn whitespace_only_content_is_a_completion_error() {
    let body = json!({"choices": [{"message": {"content": "   \n  "}}]});
    assert!(matches!(
        parse_chat_completion(&body),
        Err(OracleError::Completion(_))
    ));
}

#[test]
fn missing_message_content_is_a_completion_error() {
    let body = json!({"choices": [{"message": {"role": "assistant"}}]});
    assert!(matches!(
        parse_chat_completion(&body),
        Err(OracleError::Completion(_))
    ));
}
