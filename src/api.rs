//! HTTP endpoints and router assembly.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::{self, AuthConfig};
use crate::engine::{EngineHandle, StatusReport};
use crate::ws;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub report: StatusReport,
    pub is_connected: bool,
}

/// Liveness probe.
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Olympia server is running",
    })
}

/// Current game state plus player and connection counts.
///
/// GET /api/status
pub async fn status(State(engine): State<EngineHandle>) -> Response {
    match engine.status().await {
        Some(report) => Json(StatusResponse {
            report,
            is_connected: true,
        })
        .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Game engine not running").into_response(),
    }
}

/// Full application router: WebSocket, API and the static frontend.
pub fn router(engine: EngineHandle, auth_config: Arc<AuthConfig>, static_dir: &Path) -> Router {
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::host_ws_auth_middleware,
        ));

    Router::new()
        .merge(ws_routes)
        .route("/health", get(health))
        .route("/api/status", get(status))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
