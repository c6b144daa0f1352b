//! Document classification pipeline: chunking, per-chunk scoring, smoothing
//! and document-level aggregation.

pub mod aggregate;
pub mod chunk;
pub mod smooth;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    goals::{GOAL_COUNT, GoalScores, UNKNOWN_GOAL_INDEX, goal_label},
    observability::metrics::Metrics,
    scoring::ChunkScorer,
};

use self::{aggregate::aggregate, chunk::ChunkSet, smooth::smoothen};

/// Classification result for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub id: String,
    pub parsing_error: bool,
    pub num_chunks: usize,
    pub num_valid_chunks: usize,
    pub top_goal: &'static str,
    pub scores: GoalScores,
}

/// Tuning knobs for the classification pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineParams {
    pub chunk_max_words: usize,
    pub chunk_min_letters: usize,
    pub smoothing_window: usize,
    pub confidence_level: f32,
}

/// Runs whole documents through chunking, scoring, smoothing and aggregation.
pub struct DocumentPipeline {
    scorer: Arc<dyn ChunkScorer>,
    params: PipelineParams,
    metrics: Arc<Metrics>,
}

impl DocumentPipeline {
    #[must_use]
    pub fn new(scorer: Arc<dyn ChunkScorer>, params: PipelineParams, metrics: Arc<Metrics>) -> Self {
        Self {
            scorer,
            params,
            metrics,
        }
    }

    /// Classifies one document.
    ///
    /// Documents that yield no valid chunks short-circuit to an all-zero
    /// report carrying the unknown label; the placeholder chunk is counted
    /// but never scored.
    ///
    /// # Errors
    /// Returns an error when the scoring backend fails.
    pub async fn classify(&self, id: &str, text: &str) -> Result<DocumentReport> {
        let _classify_timer = self.metrics.classify_duration.start_timer();

        let chunk_timer = self.metrics.chunking_duration.start_timer();
        let chunk_set = ChunkSet::from_text(
            text,
            self.params.chunk_max_words,
            self.params.chunk_min_letters,
        );
        chunk_timer.observe_duration();

        if chunk_set.parsing_error() {
            self.metrics.documents_parse_errors.inc();
            self.metrics.documents_classified.inc();
            info!(document_id = %id, "document produced no valid chunks");
            return Ok(DocumentReport {
                id: id.to_string(),
                parsing_error: true,
                num_chunks: chunk_set.len(),
                num_valid_chunks: 0,
                top_goal: goal_label(UNKNOWN_GOAL_INDEX),
                scores: [0.0; GOAL_COUNT],
            });
        }

        let scoring_timer = self.metrics.scoring_duration.start_timer();
        let scored = match self.scorer.score_batch(chunk_set.chunks()).await {
            Ok(rows) => rows,
            Err(error) => {
                self.metrics.scorer_failures.inc();
                return Err(error).with_context(|| format!("scoring document {id}"));
            }
        };
        scoring_timer.observe_duration();
        #[allow(clippy::cast_precision_loss)]
        self.metrics.chunks_scored.inc_by(scored.len() as f64);

        let smoothed = smoothen(&scored, self.params.smoothing_window);
        let result = aggregate(&smoothed, self.params.confidence_level);

        self.metrics.documents_classified.inc();
        debug!(
            document_id = %id,
            num_chunks = chunk_set.len(),
            num_valid_chunks = result.num_valid_chunks,
            top_goal = goal_label(result.top_goal_index),
            "document classified"
        );

        Ok(DocumentReport {
            id: id.to_string(),
            parsing_error: false,
            num_chunks: chunk_set.len(),
            num_valid_chunks: result.num_valid_chunks,
            top_goal: goal_label(result.top_goal_index),
            scores: result.scores,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::observability::Telemetry;

    /// Scorer returning a fixed row per chunk, or failing outright.
    struct StubScorer {
        row: GoalScores,
        fail: bool,
    }

    impl StubScorer {
        fn with_goals(goals: &[usize]) -> Self {
            let mut row = [0.1f32; GOAL_COUNT];
            for g in goals {
                row[*g] = 0.9;
            }
            Self { row, fail: false }
        }

        fn failing() -> Self {
            Self {
                row: [0.0; GOAL_COUNT],
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ChunkScorer for StubScorer {
        async fn score_batch(&self, chunks: &[String]) -> Result<Vec<GoalScores>> {
            if self.fail {
                anyhow::bail!("backend unavailable");
            }
            Ok(vec![self.row; chunks.len()])
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn pipeline_with(scorer: StubScorer) -> DocumentPipeline {
        let telemetry = Telemetry::new().expect("telemetry builds");
        DocumentPipeline::new(
            Arc::new(scorer),
            PipelineParams {
                chunk_max_words: 400,
                chunk_min_letters: 5,
                smoothing_window: 5,
                confidence_level: 0.5,
            },
            telemetry.metrics_arc(),
        )
    }

    #[tokio::test]
    async fn classifies_a_document_end_to_end() {
        let pipeline = pipeline_with(StubScorer::with_goals(&[0, 1]));
        let text = "Ending poverty in all its forms everywhere\n\
                    Zero hunger and improved nutrition for all";

        let report = pipeline
            .classify("doc-1", text)
            .await
            .expect("classification succeeds");

        assert_eq!(report.id, "doc-1");
        assert!(!report.parsing_error);
        assert_eq!(report.num_chunks, 1);
        assert_eq!(report.num_valid_chunks, 1);
        assert_eq!(report.top_goal, "1-Poverty");
        assert!((report.scores[0] - 1.0).abs() < 1e-6);
        assert!((report.scores[1] - 1.0).abs() < 1e-6);
        assert!((report.scores[2] - 0.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn unparseable_document_reports_unknown_without_scoring() {
        // A failing scorer proves the placeholder chunk is never sent out.
        let pipeline = pipeline_with(StubScorer::failing());

        let report = pipeline
            .classify("doc-2", "a\nb\nc")
            .await
            .expect("parse errors do not reach the scorer");

        assert!(report.parsing_error);
        assert_eq!(report.num_chunks, 1);
        assert_eq!(report.num_valid_chunks, 0);
        assert_eq!(report.top_goal, "unknown");
        assert!(report.scores.iter().all(|s| *s == 0.0));
    }

    #[tokio::test]
    async fn below_confidence_scores_resolve_to_unknown() {
        let pipeline = pipeline_with(StubScorer::with_goals(&[]));

        let report = pipeline
            .classify("doc-3", "a perfectly ordinary line of text")
            .await
            .expect("classification succeeds");

        assert!(!report.parsing_error);
        assert_eq!(report.num_valid_chunks, 0);
        assert_eq!(report.top_goal, "unknown");
    }

    #[tokio::test]
    async fn scorer_failure_propagates() {
        let pipeline = pipeline_with(StubScorer::failing());

        let error = pipeline
            .classify("doc-4", "a perfectly ordinary line of text")
            .await
            .expect_err("backend failure surfaces");

        assert!(error.to_string().contains("doc-4"));
    }
}
