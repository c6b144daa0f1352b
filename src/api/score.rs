//! Raw per-text scoring endpoint.
//!
//! Unlike document classification, each submitted text is scored as a single
//! chunk with no smoothing or aggregation. Scores are rendered as two-decimal
//! strings, the format downstream consumers of this endpoint have always
//! parsed.

use axum::{Json, extract::State};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::json;

use crate::{
    api::{ApiError, DocumentsRequest},
    app::AppState,
    goals::GoalScores,
    scoring::ChunkScorer,
};

/// Per-goal scores rendered as `"sdg1"` through `"sdg17"` string columns.
struct RawScores(GoalScores);

impl Serialize for RawScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (g, score) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("sdg{}", g + 1), &format!("{score:.2}"))?;
        }
        map.end()
    }
}

pub async fn score_texts(
    State(state): State<AppState>,
    Json(request): Json<DocumentsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.telemetry().metrics().raw_score_requests.inc();
    let documents = request.into_documents()?;

    let texts: Vec<String> = documents.iter().map(|(_, text)| text.clone()).collect();
    let rows = state
        .scorer()
        .score_batch(&texts)
        .await
        .map_err(|error| ApiError::internal(&error))?;

    let results: Vec<serde_json::Value> = documents
        .iter()
        .zip(rows)
        .map(|((id, _), row)| {
            json!({
                "id": id,
                "scores": RawScores(row),
            })
        })
        .collect();

    Ok(Json(serde_json::Value::Array(results)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_scores_render_as_two_decimal_strings() {
        let mut row = [0.0f32; crate::goals::GOAL_COUNT];
        row[0] = 0.934;
        row[16] = 0.5;

        let value = serde_json::to_value(RawScores(row)).expect("serializes");

        assert_eq!(value["sdg1"], "0.93");
        assert_eq!(value["sdg17"], "0.50");
        assert_eq!(value["sdg2"], "0.00");
        assert_eq!(value.as_object().expect("object").len(), 17);
    }
}
