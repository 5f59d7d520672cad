//! Ollama wire format and client behaviour against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use papelada::polish::ollama::{build_request, parse_response, OllamaPolisher, DEFAULT_OLLAMA_URL};
use papelada::polish::{PolishError, Polisher, SamplingParams, SYSTEM_MESSAGE};

fn polisher(base_url: &str, timeout: Duration) -> OllamaPolisher {
    match OllamaPolisher::new(base_url, "llama3:8b", SamplingParams::default(), timeout) {
        Ok(polisher) => polisher,
        Err(err) => panic!("client should build: {err}"),
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "model": "llama3:8b",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

#[test]
fn build_request_sends_system_then_user() {
    let req = build_request("llama3:8b", "Reescreva.", &SamplingParams::default());
    assert_eq!(req.model, "llama3:8b");
    assert!(!req.stream);
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, SYSTEM_MESSAGE);
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[1].content, "Reescreva.");
}

#[test]
fn build_request_serializes_options() {
    let req = build_request("m", "p", &SamplingParams::default());
    let value = serde_json::to_value(&req).expect("request serializes");
    assert_eq!(value["stream"], json!(false));
    assert_eq!(value["options"]["top_k"], json!(45));
    assert_eq!(value["options"]["num_predict"], json!(650));
    assert!(value["options"]["stop"].is_array());
}

#[test]
fn parse_response_cleans_reply() {
    let body = chat_reply("Prompt: Texto final.\n\nNOTA: gerado automaticamente").to_string();
    match parse_response(&body) {
        Ok(text) => assert_eq!(text, "Texto final."),
        Err(err) => panic!("response should parse: {err}"),
    }
}

#[test]
fn parse_response_rejects_empty_reply() {
    let body = chat_reply("   ").to_string();
    assert!(matches!(parse_response(&body), Err(PolishError::Parse(_))));
}

#[test]
fn parse_response_rejects_malformed_body() {
    assert!(matches!(parse_response("{\"nope\": 1}"), Err(PolishError::Parse(_))));
}

#[test]
fn new_trims_trailing_slash() {
    let polisher = polisher(&format!("{DEFAULT_OLLAMA_URL}/"), Duration::from_secs(1));
    assert_eq!(polisher.base_url, DEFAULT_OLLAMA_URL);
    assert_eq!(polisher.model_id(), "llama3:8b");
}

#[tokio::test]
async fn polish_returns_cleaned_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Texto: Documento polido.")))
        .expect(1)
        .mount(&server)
        .await;

    let polisher = polisher(&server.uri(), Duration::from_secs(5));
    match polisher.polish("Reescreva.").await {
        Ok(text) => assert_eq!(text, "Documento polido."),
        Err(err) => panic!("polish should succeed: {err}"),
    }
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model \n not found"))
        .mount(&server)
        .await;

    let polisher = polisher(&server.uri(), Duration::from_secs(5));
    match polisher.polish("Reescreva.").await {
        Err(PolishError::HttpStatus { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "model not found");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("tarde demais"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let polisher = polisher(&server.uri(), Duration::from_millis(100));
    assert!(matches!(
        polisher.polish("Reescreva.").await,
        Err(PolishError::Timeout)
    ));
}

#[test]
fn new_rejects_non_http_base_url() {
    for bad in ["ollama:11434", "ftp://host/", "not a url"] {
        let result = OllamaPolisher::new(bad, "m", SamplingParams::default(), Duration::from_secs(1));
        assert!(
            matches!(result, Err(PolishError::InvalidUrl { .. })),
            "{bad} should be rejected"
        );
    }
}
