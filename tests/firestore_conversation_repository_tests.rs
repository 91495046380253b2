mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::FakeUpstream;
use negotiation_analysis::{
    Analysis, ConversationRepository, DomainError, FirestoreConversationRepository, GcpSettings,
    StaticTokenProvider,
};
use serde_json::json;

fn repo(base_url: &str) -> FirestoreConversationRepository {
    FirestoreConversationRepository::new(
        &GcpSettings::new("demo-project", "us-central1"),
        Arc::new(StaticTokenProvider::new("owner")),
    )
    .with_base_url(base_url)
}

#[tokio::test]
async fn record_analysis_commits_a_masked_update_with_server_timestamp() {
    let upstream = FakeUpstream::spawn(
        StatusCode::OK,
        json!({"writeResults": [{"updateTime": "2024-05-01T12:30:00Z"}], "commitTime": "2024-05-01T12:30:00Z"}),
    )
    .await;

    repo(&upstream.base_url)
        .record_analysis("abc123", &Analysis::from_model_output("Clarity: 4/5..."))
        .await
        .unwrap();

    let request = upstream.single_request().await;
    assert_eq!(request.method, Method::POST);
    assert!(request
        .path_and_query
        .starts_with("/v1/projects/demo-project/databases/"));
    assert!(request.path_and_query.ends_with("/documents:commit"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer owner"));

    let write = &request.body["writes"][0];
    assert!(write["update"]["name"]
        .as_str()
        .unwrap()
        .ends_with("/documents/conversations/abc123"));
    assert_eq!(
        write["update"]["fields"]["latestAnalysisFeedback"]["stringValue"],
        "[ANALYSIS]:\nClarity: 4/5..."
    );
    assert_eq!(write["updateMask"]["fieldPaths"], json!(["latestAnalysisFeedback"]));
    assert_eq!(write["updateTransforms"][0]["fieldPath"], "lastAnalysisTimestamp");
    assert_eq!(write["currentDocument"]["exists"], true);
}

#[tokio::test]
async fn record_analysis_on_missing_document_is_not_found() {
    let upstream = FakeUpstream::spawn(
        StatusCode::NOT_FOUND,
        json!({"error": {"code": 404, "status": "NOT_FOUND"}}),
    )
    .await;

    let err = repo(&upstream.base_url)
        .record_analysis("abc123", &Analysis::from_model_output("x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn record_analysis_server_error_is_a_persistence_failure() {
    let upstream = FakeUpstream::spawn(
        StatusCode::FORBIDDEN,
        json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}),
    )
    .await;

    let err = repo(&upstream.base_url)
        .record_analysis("abc123", &Analysis::from_model_output("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PersistenceFailure(_)));
}

#[tokio::test]
async fn find_by_id_reads_the_analysis_fields() {
    let upstream = FakeUpstream::spawn(
        StatusCode::OK,
        json!({
            "name": "projects/demo-project/databases/(default)/documents/conversations/abc123",
            "fields": {
                "latestAnalysisFeedback": {"stringValue": "[ANALYSIS]:\nok"},
                "lastAnalysisTimestamp": {"timestampValue": "2024-05-01T12:30:00Z"}
            }
        }),
    )
    .await;

    let record = repo(&upstream.base_url)
        .find_by_id("abc123")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.id(), "abc123");
    assert_eq!(record.latest_analysis_feedback(), Some("[ANALYSIS]:\nok"));
    assert_eq!(
        record.last_analysis_timestamp().map(|t| t.timestamp()),
        Some(1_714_566_600)
    );
    assert_eq!(upstream.single_request().await.method, Method::GET);
}

#[tokio::test]
async fn find_by_id_encodes_reserved_url_characters() {
    let upstream = FakeUpstream::spawn(StatusCode::NOT_FOUND, json!({})).await;

    repo(&upstream.base_url).find_by_id("deal?v=2#a%").await.unwrap();

    let request = upstream.single_request().await;
    assert!(
        request
            .path_and_query
            .ends_with("/documents/conversations/deal%3Fv=2%23a%25"),
        "unexpected path {}",
        request.path_and_query
    );
}

#[tokio::test]
async fn slash_in_conversation_id_never_reaches_firestore() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, json!({})).await;
    let repo = repo(&upstream.base_url);

    let err = repo
        .record_analysis("abc/123", &Analysis::from_model_output("x"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(repo.find_by_id("abc/123").await.unwrap_err().is_invalid_argument());
    assert!(repo.create("abc/123").await.unwrap_err().is_invalid_argument());
    assert!(upstream.requests().await.is_empty());
}

#[tokio::test]
async fn find_by_id_of_missing_document_is_none() {
    let upstream = FakeUpstream::spawn(StatusCode::NOT_FOUND, json!({})).await;

    assert!(repo(&upstream.base_url)
        .find_by_id("abc123")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn create_uses_the_conversation_id_as_document_id() {
    let upstream = FakeUpstream::spawn(StatusCode::OK, json!({"name": "x", "fields": {}})).await;

    let record = repo(&upstream.base_url).create("abc123").await.unwrap();
    assert_eq!(record.id(), "abc123");

    let request = upstream.single_request().await;
    assert!(request
        .path_and_query
        .contains("/documents/conversations?documentId=abc123"));
}

#[tokio::test]
async fn create_existing_document_is_already_exists() {
    let upstream = FakeUpstream::spawn(StatusCode::CONFLICT, json!({})).await;

    let err = repo(&upstream.base_url).create("abc123").await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists(_)));
}
