use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body returned by the `healthCheck` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "OK".to_string(),
            message: "Firebase is healthy!".to_string(),
        }
    }
}

/// Liveness probe. Stateless, accepts any method and ignores the body.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    info!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::healthy()))
}
