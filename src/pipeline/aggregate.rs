//! Converts a smoothed score matrix into document-level scores and a top goal.

use crate::goals::{GOAL_COUNT, GoalScores, UNKNOWN_GOAL_INDEX};

/// Document-level aggregation output.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Per-goal share of valid chunks asserting the goal, in `[0, 1]`.
    pub scores: GoalScores,
    /// Index of the winning goal, or [`UNKNOWN_GOAL_INDEX`].
    pub top_goal_index: usize,
    /// Chunks that asserted at least one goal after smoothing.
    pub num_valid_chunks: usize,
}

impl Aggregate {
    fn unknown() -> Self {
        Self {
            scores: [0.0; GOAL_COUNT],
            top_goal_index: UNKNOWN_GOAL_INDEX,
            num_valid_chunks: 0,
        }
    }
}

/// Thresholds smoothed rows into binary goal assertions, counts them, and
/// normalizes by the number of valid chunks.
///
/// Undefined rows (incomplete smoothing window) contribute to nothing. A
/// smoothed value equal to `confidence` counts as an assertion. When no chunk
/// asserts any goal the result is all-zero scores and the unknown label; the
/// division is never performed with a zero denominator.
#[must_use]
pub fn aggregate(smoothed: &[Option<GoalScores>], confidence: f32) -> Aggregate {
    let mut goal_counts = [0usize; GOAL_COUNT];
    let mut num_valid_chunks = 0usize;

    for row in smoothed.iter().flatten() {
        let mut any = false;
        for (g, value) in row.iter().enumerate() {
            if *value >= confidence {
                goal_counts[g] += 1;
                any = true;
            }
        }
        if any {
            num_valid_chunks += 1;
        }
    }

    if num_valid_chunks == 0 {
        return Aggregate::unknown();
    }

    let mut scores = [0.0f32; GOAL_COUNT];
    #[allow(clippy::cast_precision_loss)]
    for (g, count) in goal_counts.iter().enumerate() {
        scores[g] = *count as f32 / num_valid_chunks as f32;
    }

    // First-occurrence arg-max: ties resolve to the lowest goal index.
    let mut top_goal_index = UNKNOWN_GOAL_INDEX;
    let mut best = 0.0f32;
    for (g, score) in scores.iter().enumerate() {
        if *score > best {
            best = *score;
            top_goal_index = g;
        }
    }

    Aggregate {
        scores,
        top_goal_index,
        num_valid_chunks,
    }
}
