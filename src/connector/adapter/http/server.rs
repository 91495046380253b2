use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::AnalyzeMessageUseCase;
use crate::domain::AnalysisRequest;

use super::{health_check, CallableError, CallableRequest, CallableResponse};

pub const ANALYZE_ROUTE: &str = "/analyzeNegotiationMessage";
pub const HEALTH_ROUTE: &str = "/healthCheck";

/// Handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    analyze: Arc<AnalyzeMessageUseCase>,
}

impl AppState {
    pub fn new(analyze: Arc<AnalyzeMessageUseCase>) -> Self {
        Self { analyze }
    }
}

/// Routes:
///
/// - `POST /analyzeNegotiationMessage`: callable analysis endpoint
/// - `ANY /healthCheck`: liveness probe
///
/// CORS reflects the caller's origin, so every origin is allowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(ANALYZE_ROUTE, post(analyze_negotiation_message))
        .route(HEALTH_ROUTE, any(health_check))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn analyze_negotiation_message(
    State(state): State<AppState>,
    body: Result<Json<CallableRequest<AnalysisRequest>>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(body)) => body.into_data(),
        Err(rejection) => {
            warn!("Rejected malformed callable request: {}", rejection.body_text());
            return CallableError::invalid_argument("Request body must be a JSON object.")
                .into_response();
        }
    };

    match state.analyze.execute(request).await {
        Ok(outcome) => Json(CallableResponse { result: outcome }).into_response(),
        Err(e) => CallableError::from(&e).into_response(),
    }
}

/// Serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
