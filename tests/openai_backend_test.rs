//! Integration tests for the OpenAI-compatible backend against a mock server.

use edgecommit::config::Config;
use edgecommit::error::LlmError;
use edgecommit::llm::{CompletionBackend, CompletionRequest, OpenAiBackend};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> OpenAiBackend {
    let config = Config {
        api_key: Some("sk-test-key".to_string()),
        model: "gpt-4o-mini".to_string(),
        api_base_url: format!("{}/v1", server.uri()),
        ..Config::default()
    };
    OpenAiBackend::from_config(&config).expect("api key is set")
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system: "You write commit messages.".to_string(),
        prompt: "Type: feat".to_string(),
        temperature: 0.7,
        max_tokens: 300,
    }
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_complete_sends_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 300,
            "messages": [
                { "role": "system", "content": "You write commit messages." },
                { "role": "user", "content": "Type: feat" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(json!("  feat: add parser\n"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = backend_for(&server).complete(request()).await.unwrap();
    assert_eq!(text, "feat: add parser");
}

#[tokio::test]
async fn test_null_content_is_empty_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let text = backend_for(&server).complete(request()).await.unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_http_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let result = backend_for(&server).complete(request()).await;
    match result {
        Err(LlmError::Api { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_choices_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let result = backend_for(&server).complete(request()).await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = backend_for(&server).complete(request()).await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    let config = Config {
        api_key: Some("sk-test-key".to_string()),
        api_base_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };
    let backend = OpenAiBackend::from_config(&config).unwrap();

    let result = backend.complete(request()).await;
    assert!(matches!(result, Err(LlmError::Request(_))));
}
