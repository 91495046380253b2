//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use negotiation_analysis::{DomainError, PromptSource, PromptTemplate};

pub const TEST_TEMPLATE: &str = "Coach this negotiation message:\n{{USER_MESSAGE}}";

/// Prompt source serving a fixed template.
pub struct StaticPromptSource {
    text: String,
}

impl StaticPromptSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticPromptSource {
    fn default() -> Self {
        Self::new(TEST_TEMPLATE)
    }
}

#[async_trait]
impl PromptSource for StaticPromptSource {
    async fn load(&self) -> Result<PromptTemplate, DomainError> {
        Ok(PromptTemplate::new(self.text.clone()))
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// A request captured by [`FakeUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A local HTTP server answering every request with one canned JSON response
/// and recording what it received.
pub struct FakeUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    pub async fn spawn(status: StatusCode, body: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            status,
            body,
            requests: requests.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake upstream");
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn single_request(&self) -> RecordedRequest {
        let requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().expect("one request")
    }
}

async fn record(
    State(state): State<UpstreamState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let recorded = RecordedRequest {
        method,
        path_and_query: uri
            .path_and_query()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().await.push(recorded);
    (state.status, Json(state.body.clone()))
}
