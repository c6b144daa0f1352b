//! Wires configuration, telemetry, the scorer and the pipeline into the
//! application state shared by all HTTP handlers.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    clients::{InferenceClient, InferenceConfig},
    config::Config,
    observability::Telemetry,
    pipeline::{DocumentPipeline, PipelineParams},
    scoring::ChunkScorer,
};

/// Long-lived components, built once at startup and shared by every request.
#[derive(Clone)]
pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    scorer: Arc<dyn ChunkScorer>,
    pipeline: Arc<DocumentPipeline>,
}

impl ComponentRegistry {
    /// Builds the full component set, including the inference client.
    ///
    /// # Errors
    /// Fails when telemetry cannot be initialized or the inference client
    /// cannot be constructed (bad URL, unreadable vocabulary).
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new().context("failed to initialize telemetry")?;
        let scorer: Arc<dyn ChunkScorer> = Arc::new(InferenceClient::new(InferenceConfig {
            base_url: config.inference_base_url().to_string(),
            vocab_path: config.vocab_path(),
            batch_size: config.batch_size().get(),
            max_concurrency: config.scorer_max_concurrency().get(),
            connect_timeout: config.inference_connect_timeout(),
            total_timeout: config.inference_total_timeout(),
        })?);
        Ok(Self::assemble(config, telemetry, scorer))
    }

    /// Builds the component set around an externally supplied scorer.
    ///
    /// # Errors
    /// Fails when telemetry cannot be initialized.
    pub fn with_scorer(config: Config, scorer: Arc<dyn ChunkScorer>) -> Result<Self> {
        let telemetry = Telemetry::new().context("failed to initialize telemetry")?;
        Ok(Self::assemble(config, telemetry, scorer))
    }

    fn assemble(config: Config, telemetry: Telemetry, scorer: Arc<dyn ChunkScorer>) -> Self {
        let pipeline = Arc::new(DocumentPipeline::new(
            Arc::clone(&scorer),
            PipelineParams {
                chunk_max_words: config.chunk_max_words(),
                chunk_min_letters: config.chunk_min_letters(),
                smoothing_window: config.smoothing_window().get(),
                confidence_level: config.confidence_level(),
            },
            telemetry.metrics_arc(),
        ));
        Self {
            config: Arc::new(config),
            telemetry,
            scorer,
            pipeline,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    #[must_use]
    pub fn scorer(&self) -> &Arc<dyn ChunkScorer> {
        &self.scorer
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<DocumentPipeline> {
        &self.pipeline
    }
}

/// Shared handler state.
pub type AppState = Arc<ComponentRegistry>;
