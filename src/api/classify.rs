//! Document classification endpoint: full chunking, smoothing and
//! aggregation per document.

use axum::{Json, extract::State};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::{
    api::{ApiError, DocumentsRequest},
    app::AppState,
    goals::score_column,
    pipeline::DocumentReport,
    scoring::round_probability,
};

/// One classified document, rendered as a flat record with `sdg_1` through
/// `sdg_17` score columns alongside the summary fields.
pub(crate) struct DocumentRecord(pub(crate) DocumentReport);

impl Serialize for DocumentRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = &self.0;
        let mut map = serializer.serialize_map(Some(5 + report.scores.len()))?;
        map.serialize_entry("id", &report.id)?;
        map.serialize_entry("parsing_error", &report.parsing_error)?;
        map.serialize_entry("num_chunks", &report.num_chunks)?;
        map.serialize_entry("num_valid_chunks", &report.num_valid_chunks)?;
        map.serialize_entry("document_top_sdg", report.top_goal)?;
        for (g, score) in report.scores.iter().enumerate() {
            map.serialize_entry(&score_column(g), &round_probability(*score))?;
        }
        map.end()
    }
}

pub async fn classify_documents(
    State(state): State<AppState>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let documents = request.into_documents()?;

    let metrics = state.telemetry().metrics();
    metrics.active_requests.inc();
    let mut records = Vec::with_capacity(documents.len());
    for (id, text) in &documents {
        match state.pipeline().classify(id, text).await {
            Ok(report) => records.push(DocumentRecord(report)),
            Err(error) => {
                metrics.active_requests.dec();
                return Err(ApiError::internal(&error));
            }
        }
    }
    metrics.active_requests.dec();

    Ok(Json(json!({ "documents": records })))
}
