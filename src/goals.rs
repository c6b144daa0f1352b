//! The 17 UN Sustainable Development Goals as the classification label space.

/// Number of real SDG goals. The model emits exactly this many probabilities.
pub const GOAL_COUNT: usize = 17;

/// Sentinel index for documents where no goal ever clears the confidence
/// threshold. Not a model output, only a derived label.
pub const UNKNOWN_GOAL_INDEX: usize = GOAL_COUNT;

/// Goal labels by index. Index 0..=16 map to SDG 1..=17, index 17 is the
/// synthetic "unknown" label.
pub const SDG_GOALS: [&str; GOAL_COUNT + 1] = [
    "1-Poverty",
    "2-Hunger",
    "3-Health",
    "4-Education",
    "5-Gender",
    "6-Water",
    "7-Energy",
    "8-Work",
    "9-Innovation",
    "10-Inequalities",
    "11-Sustainable Cities",
    "12-Consumption",
    "13-Climate Action",
    "14-Life Below Water",
    "15-Life on Land",
    "16-Institutions",
    "17-Partnerships",
    "unknown",
];

/// One probability per goal, in model output order.
pub type GoalScores = [f32; GOAL_COUNT];

/// Resolves a goal index (including the sentinel) to its label.
#[must_use]
pub fn goal_label(index: usize) -> &'static str {
    SDG_GOALS.get(index).copied().unwrap_or("unknown")
}

/// Tabular column name for a goal index, `sdg_1` through `sdg_17`.
#[must_use]
pub fn score_column(index: usize) -> String {
    format!("sdg_{}", index + 1)
}
