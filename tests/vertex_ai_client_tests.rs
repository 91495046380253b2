mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};
use common::{FakeUpstream, StaticPromptSource};
use negotiation_analysis::{
    AnalysisRequest, AnalyzeMessageUseCase, ConversationRepository, DomainError, GcpSettings,
    GenerativeModel, InMemoryConversationRepository, StaticTokenProvider, VertexAiClient,
};
use serde_json::json;

fn client(base_url: &str) -> VertexAiClient {
    VertexAiClient::new(
        &GcpSettings::new("demo-project", "us-central1"),
        Arc::new(StaticTokenProvider::new("test-token")),
    )
    .with_base_url(base_url)
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 17}
    })
}

#[tokio::test]
async fn generate_posts_a_single_user_turn_with_bearer_token() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, candidate("Clarity: 4/5...")).await;

    let text = client(&upstream.base_url)
        .generate("Score: I need a 10% discount")
        .await
        .unwrap();
    assert_eq!(text, "Clarity: 4/5...");

    let request = upstream.single_request().await;
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.path_and_query,
        "/v1/projects/demo-project/locations/us-central1/publishers/google/models/gemini-1.5-flash:generateContent"
    );
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(request.body["contents"][0]["role"], "user");
    assert_eq!(
        request.body["contents"][0]["parts"][0]["text"],
        "Score: I need a 10% discount"
    );
    assert_eq!(request.body["generationConfig"]["candidateCount"], 1);
}

#[tokio::test]
async fn model_override_changes_the_endpoint() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, candidate("ok")).await;

    client(&upstream.base_url)
        .with_model("gemini-1.5-pro")
        .generate("prompt")
        .await
        .unwrap();

    let request = upstream.single_request().await;
    assert!(request
        .path_and_query
        .ends_with("/models/gemini-1.5-pro:generateContent"));
}

#[tokio::test]
async fn error_status_is_service_unavailable() {
    let upstream = FakeUpstream::spawn(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}}),
    )
    .await;

    let err = client(&upstream.base_url).generate("prompt").await.unwrap_err();
    assert!(matches!(err, DomainError::AiServiceUnavailable(_)));
}

#[tokio::test]
async fn empty_candidates_are_malformed() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, json!({"candidates": []})).await;

    let err = client(&upstream.base_url).generate("prompt").await.unwrap_err();
    assert!(matches!(err, DomainError::MalformedAiResponse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_service_unavailable() {
    let err = client("http://127.0.0.1:1")
        .generate("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AiServiceUnavailable(_)));
}

#[tokio::test]
async fn request_timeout_is_applied() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accepts connections and never answers.
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let started = Instant::now();
    let err = client(&format!("http://{addr}"))
        .with_timeout(Duration::from_millis(200))
        .generate("prompt")
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::AiServiceUnavailable(_)));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn analysis_pipeline_stores_the_vertex_reply() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, candidate("Clarity: 4/5...")).await;
    let conversations = Arc::new(InMemoryConversationRepository::with_conversations(["abc123"]));
    let use_case = AnalyzeMessageUseCase::new(
        Arc::new(StaticPromptSource::default()),
        Arc::new(client(&upstream.base_url)),
        conversations.clone(),
    );

    use_case
        .execute(AnalysisRequest::new("I need a 10% discount", "abc123"))
        .await
        .unwrap();

    let request = upstream.single_request().await;
    assert_eq!(
        request.body["contents"][0]["parts"][0]["text"],
        "Coach this negotiation message:\nI need a 10% discount"
    );
    let record = conversations.find_by_id("abc123").await.unwrap().unwrap();
    assert_eq!(
        record.latest_analysis_feedback(),
        Some("[ANALYSIS]:\nClarity: 4/5...")
    );
}
