//! HTTP surface: health probes, Prometheus metrics, raw per-text scoring and
//! the document classification endpoint.

pub(crate) mod classify;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod score;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics::render))
        .route("/sdg", post(score::score_texts))
        .route("/v1/classify/documents", post(classify::classify_documents))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler-level error carrying an HTTP status and a client-facing message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(error: &anyhow::Error) -> Self {
        tracing::error!(error = %error, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{error:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Request envelope shared by the scoring and classification endpoints:
/// `{"data": [{"<id>": "<text>"}, ...]}`. Multi-entry objects are flattened
/// in key order; ids keep their overall order of appearance.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct DocumentsRequest {
    data: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl DocumentsRequest {
    /// Flattens the envelope into `(id, text)` pairs.
    ///
    /// # Errors
    /// Rejects entries whose value is not a string.
    pub(crate) fn into_documents(self) -> Result<Vec<(String, String)>, ApiError> {
        let mut documents = Vec::new();
        for entry in self.data {
            for (id, value) in entry {
                let serde_json::Value::String(text) = value else {
                    return Err(ApiError::bad_request(format!(
                        "document {id} must map to a string"
                    )));
                };
                documents.push((id, text));
            }
        }
        Ok(documents)
    }
}
