//! Integration tests for the Gemini REST client against a mock server

use super::test_utils::{gemini_error_response, gemini_text_response};
use memolive::error::ApiError;
use memolive::provider::{
    GeminiClient, GenerationClient, HttpTimeouts, SafetySetting, ServiceConfig,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(Some(server.uri()), HttpTimeouts::default()).unwrap()
}

#[tokio::test]
async fn test_generate_posts_prompt_with_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Write something" }] }]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text_response("[MUSIC: IU]\n\nStory body")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = client_for(&mock_server)
        .generate(&ServiceConfig::new("gemini-pro"), "test-key", "Write something")
        .await
        .unwrap();

    assert_eq!(text, "[MUSIC: IU]\n\nStory body");
}

#[tokio::test]
async fn test_generate_sends_capabilities_on_v1beta() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(serde_json::json!({
            "tools": [{ "google_search": {} }],
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ServiceConfig::new("gemini-2.0-flash")
        .with_web_search()
        .with_safety(vec![SafetySetting::new(
            "HARM_CATEGORY_HARASSMENT",
            "BLOCK_NONE",
        )]);

    let text = client_for(&mock_server)
        .generate(&config, "test-key", "prompt")
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/missing:generateContent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(gemini_error_response(
            404,
            "NOT_FOUND",
            "models/missing is not found",
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/busy:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(gemini_error_response(
            429,
            "RESOURCE_EXHAUSTED",
            "quota exceeded",
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/locked:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(gemini_error_response(
            400,
            "INVALID_ARGUMENT",
            "API key not valid. Please pass a valid API key.",
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let missing = client
        .generate(&ServiceConfig::new("missing"), "k", "p")
        .await
        .unwrap_err();
    assert!(matches!(missing, ApiError::ProviderModelNotFound(ref m) if m.contains("not found")));

    let busy = client
        .generate(&ServiceConfig::new("busy"), "k", "p")
        .await
        .unwrap_err();
    assert!(matches!(busy, ApiError::ProviderRateLimit(_)));

    let locked = client
        .generate(&ServiceConfig::new("locked"), "k", "p")
        .await
        .unwrap_err();
    assert!(matches!(locked, ApiError::ProviderAuthFailed(_)));
}

#[tokio::test]
async fn test_invalid_key_is_auth_failure_for_any_key_length() {
    let mock_server = MockServer::start().await;
    let long_key = "AIzaSyInvalidKeyForTests0123456789abc";

    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": format!("API key not valid. Please pass a valid API key. ({})", long_key),
                "status": "INVALID_ARGUMENT",
                "details": [{ "reason": "API_KEY_INVALID" }]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let config = ServiceConfig::new("gemini-pro");

    let short = client.generate(&config, "k", "p").await.unwrap_err();
    assert!(
        matches!(short, ApiError::ProviderAuthFailed(ref m) if m.contains("API key not valid")),
        "{:?}",
        short
    );

    let long = client.generate(&config, long_key, "p").await.unwrap_err();
    assert!(matches!(long, ApiError::ProviderAuthFailed(_)), "{:?}", long);
    assert!(!long.to_string().contains(long_key));
}

#[tokio::test]
async fn test_error_text_never_contains_key() {
    let mock_server = MockServer::start().await;
    let secret = "AIzaSySecretValue123";

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(format!(
            "internal failure for key={}",
            secret
        )))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate(&ServiceConfig::new("gemini-pro"), secret, "p")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ProviderRequestFailed(_)));
    assert!(!err.to_string().contains(secret));
}

#[tokio::test]
async fn test_blocked_prompt_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate(&ServiceConfig::new("gemini-pro"), "k", "p")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::EmptyResponse(ref m) if m.contains("SAFETY")));
}

#[tokio::test]
async fn test_request_timeout_is_attempt_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text_response("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let client = GeminiClient::new(
        Some(mock_server.uri()),
        HttpTimeouts {
            connect: Duration::from_secs(1),
            request: Duration::from_millis(200),
        },
    )
    .unwrap();

    let err = client
        .generate(&ServiceConfig::new("gemini-pro"), "k", "p")
        .await
        .unwrap_err();
    assert!(err.is_attempt_failure());
}
