//! Trailing moving average over consecutive chunks' score vectors.
//!
//! Chunk-level predictions are noisy; averaging each chunk with the chunks
//! preceding it dampens spikes before thresholding. The filter is causal: row
//! `i` averages rows `i - window + 1 ..= i`, and rows without a full window
//! behind them carry no value and are excluded from aggregation.

use crate::goals::{GOAL_COUNT, GoalScores};

/// Applies a per-goal rolling mean of `window_size` rows.
///
/// When the document has fewer rows than `window_size`, the effective window
/// shrinks to the row count, so short documents still produce one defined row
/// (the full-document average). The leading `window - 1` rows come back as
/// `None`.
///
/// Sums are accumulated once per column, so the cost is O(rows * goals)
/// regardless of the window size.
#[must_use]
pub fn smoothen(rows: &[GoalScores], window_size: usize) -> Vec<Option<GoalScores>> {
    if rows.is_empty() {
        return Vec::new();
    }
    let window = window_size.clamp(1, rows.len());

    // prefix[i][g] = sum of rows[0..i][g]
    let mut prefix = vec![[0.0f64; GOAL_COUNT]; rows.len() + 1];
    for (i, row) in rows.iter().enumerate() {
        for g in 0..GOAL_COUNT {
            prefix[i + 1][g] = prefix[i][g] + f64::from(row[g]);
        }
    }

    let mut smoothed = Vec::with_capacity(rows.len());
    for i in 0..rows.len() {
        if i + 1 < window {
            smoothed.push(None);
            continue;
        }
        let mut mean = [0.0f32; GOAL_COUNT];
        for g in 0..GOAL_COUNT {
            let sum = prefix[i + 1][g] - prefix[i + 1 - window][g];
            #[allow(clippy::cast_possible_truncation)]
            {
                mean[g] = (sum / window as f64) as f32;
            }
        }
        smoothed.push(Some(mean));
    }
    smoothed
}
