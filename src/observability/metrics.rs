/// Prometheus metric definitions for the classification pipeline.
use prometheus::{
    Counter, Gauge, Histogram, Registry, register_counter_with_registry,
    register_gauge_with_registry, register_histogram_with_registry,
};

/// Metric collector shared across handlers and the pipeline.
#[derive(Debug, Clone)]
pub struct Metrics {
    // Counters
    pub documents_classified: Counter,
    pub documents_parse_errors: Counter,
    pub chunks_scored: Counter,
    pub scorer_failures: Counter,
    pub raw_score_requests: Counter,

    // Histograms
    pub chunking_duration: Histogram,
    pub scoring_duration: Histogram,
    pub classify_duration: Histogram,

    // Gauges
    pub active_requests: Gauge,
}

impl Metrics {
    /// Registers the full metric set against `registry`.
    ///
    /// # Errors
    /// Returns an error when a metric name collides or registration fails.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            documents_classified: register_counter_with_registry!(
                "sdg_documents_classified_total",
                "Total number of documents run through the aggregation pipeline",
                registry
            )?,
            documents_parse_errors: register_counter_with_registry!(
                "sdg_documents_parse_errors_total",
                "Documents that produced zero valid chunks",
                registry
            )?,
            chunks_scored: register_counter_with_registry!(
                "sdg_chunks_scored_total",
                "Total number of chunks sent to the inference backend",
                registry
            )?,
            scorer_failures: register_counter_with_registry!(
                "sdg_scorer_failures_total",
                "Failed scoring calls against the inference backend",
                registry
            )?,
            raw_score_requests: register_counter_with_registry!(
                "sdg_raw_score_requests_total",
                "Requests served by the raw per-text scoring endpoint",
                registry
            )?,
            chunking_duration: register_histogram_with_registry!(
                "sdg_chunking_duration_seconds",
                "Duration of document chunking",
                registry
            )?,
            scoring_duration: register_histogram_with_registry!(
                "sdg_scoring_duration_seconds",
                "Duration of a full scoring pass for one document",
                registry
            )?,
            classify_duration: register_histogram_with_registry!(
                "sdg_classify_duration_seconds",
                "End-to-end duration of one document classification",
                registry
            )?,
            active_requests: register_gauge_with_registry!(
                "sdg_active_requests",
                "Classification requests currently in flight",
                registry
            )?,
        })
    }
}
