//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{app::AppState, scoring::ChunkScorer};

/// Liveness: the process is up and serving.
pub async fn live(State(state): State<AppState>) -> impl IntoResponse {
    state.telemetry().record_live_probe();
    Json(json!({ "status": "ok" }))
}

/// Readiness: the inference backend answers its health endpoint. Reports
/// degraded with 503 otherwise so orchestrators hold traffic back.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    state.telemetry().record_ready_probe();
    match state.scorer().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(error) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "error": format!("{error:#}"),
            })),
        ),
    }
}
