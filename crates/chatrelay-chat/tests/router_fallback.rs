use std::sync::Arc;

use chatrelay_chat::{
    CompletionRouter, GeminiBackend, GenerationParams, HuggingFaceBackend, TextBackend,
};
use chatrelay_common::Error;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" }
        }]
    })
}

fn two_tier_router(
    primary_server: &MockServer,
    fallback_server: &MockServer,
) -> CompletionRouter {
    let primary = GeminiBackend::new("primary-key".to_string(), "gemini-1.5-flash".to_string())
        .with_base_url(primary_server.uri());
    let fallback = HuggingFaceBackend::new("fallback-key".to_string(), "some/model".to_string())
        .with_base_url(fallback_server.uri());

    CompletionRouter::new(
        vec![
            Arc::new(primary) as Arc<dyn TextBackend>,
            Arc::new(fallback) as Arc<dyn TextBackend>,
        ],
        GenerationParams::default(),
    )
    .expect("router should build")
}

#[tokio::test]
async fn primary_success_never_touches_the_fallback() {
    let primary_server = MockServer::start().await;
    let fallback_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("From primary")))
        .expect(1)
        .mount(&primary_server)
        .await;

    // Any request against the fallback fails the test on drop.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "x" }])))
        .expect(0)
        .mount(&fallback_server)
        .await;

    let router = two_tier_router(&primary_server, &fallback_server);
    let reply = router.complete("User: Hi\nAssistant:").await.unwrap();

    assert_eq!(reply, "From primary");
}

#[tokio::test]
async fn primary_failure_is_absorbed_by_the_fallback() {
    let primary_server = MockServer::start().await;
    let fallback_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&primary_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "Hi there" }])),
        )
        .expect(1)
        .mount(&fallback_server)
        .await;

    let router = two_tier_router(&primary_server, &fallback_server);
    let reply = router.complete("User: Hi\nAssistant:").await.unwrap();

    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn malformed_primary_body_also_falls_back() {
    let primary_server = MockServer::start().await;
    let fallback_server = MockServer::start().await;

    // 200 with an envelope the normalizer cannot extract text from.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&primary_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "generated_text": "rescued" }])),
        )
        .mount(&fallback_server)
        .await;

    let router = two_tier_router(&primary_server, &fallback_server);
    let reply = router.complete("Assistant:").await.unwrap();

    assert_eq!(reply, "rescued");
}

#[tokio::test]
async fn exhausted_chain_reports_both_causes() {
    let primary_server = MockServer::start().await;
    let fallback_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad api key"))
        .mount(&primary_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&fallback_server)
        .await;

    let router = two_tier_router(&primary_server, &fallback_server);
    let err = router.complete("Assistant:").await.unwrap_err();

    match err {
        Error::BackendsExhausted(causes) => {
            assert!(causes.contains("gemini"));
            assert!(causes.contains("bad api key"));
            assert!(causes.contains("huggingface"));
            assert!(causes.contains("rate limited"));
        }
        other => panic!("expected exhausted error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_backend_chain_is_rejected_at_construction() {
    let err = CompletionRouter::new(Vec::new(), GenerationParams::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
