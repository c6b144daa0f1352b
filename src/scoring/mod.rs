//! Scoring boundary: an injected capability mapping chunk text to goal
//! probabilities. The model itself lives behind this trait; the pipeline never
//! sees logits, devices, or batching details beyond row order.

pub mod encoding;

use anyhow::Result;
use async_trait::async_trait;

use crate::goals::GoalScores;

/// Scores batches of text chunks against the 17 goals.
///
/// Implementations may split the input into smaller hardware batches, but the
/// returned rows must line up 1:1 with the input order. Probabilities are
/// independent per goal (multi-label), each in `[0, 1]`.
#[async_trait]
pub trait ChunkScorer: Send + Sync {
    /// Scores every chunk, preserving row order. Fails outright on any
    /// backend error; callers do not retry.
    async fn score_batch(&self, chunks: &[String]) -> Result<Vec<GoalScores>>;

    /// Cheap reachability probe for readiness checks.
    async fn ping(&self) -> Result<()>;
}

/// Logit to probability.
#[must_use]
pub fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit).exp())
}

/// Rounds a probability to four decimals, the precision the batch pipeline
/// has always emitted.
#[must_use]
pub fn round_probability(p: f32) -> f32 {
    (p * 10_000.0).round() / 10_000.0
}
