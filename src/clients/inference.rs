//! Client for the model inference backend.
//!
//! The fine-tuned transformer runs in a separate process; this client encodes
//! chunk text, posts fixed-size batches of tensors, and turns the returned
//! logits into goal probabilities. The backend is a shared, memory-bound
//! resource, so in-flight batches are limited by a semaphore (capacity 1
//! unless more model replicas are configured). The permit covers only the
//! scoring call itself; chunking and aggregation never hold it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::goals::{GOAL_COUNT, GoalScores};
use crate::scoring::encoding::{ChunkEncoder, EncodedChunk};
use crate::scoring::{ChunkScorer, round_probability, sigmoid};

/// Connection settings for the inference backend.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub vocab_path: PathBuf,
    pub batch_size: usize,
    pub max_concurrency: usize,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct LogitsRequest<'a> {
    instances: &'a [EncodedChunk],
}

#[derive(Debug, Deserialize)]
struct LogitsResponse {
    logits: Vec<Vec<f32>>,
}

/// HTTP scorer backed by the model server.
#[derive(Debug)]
pub struct InferenceClient {
    client: Client,
    base_url: Url,
    encoder: ChunkEncoder,
    batch_size: usize,
    permits: Arc<Semaphore>,
}

impl InferenceClient {
    /// Builds the client and loads the tokenizer vocabulary.
    ///
    /// # Errors
    /// Fails when the base URL is invalid, the HTTP client cannot be built,
    /// or the vocabulary file cannot be loaded.
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build inference HTTP client")?;
        let base_url = Url::parse(&config.base_url).context("invalid inference base URL")?;
        let encoder = ChunkEncoder::from_vocab(&config.vocab_path)?;
        ensure!(config.batch_size > 0, "inference batch size must be positive");
        ensure!(
            config.max_concurrency > 0,
            "scorer concurrency must be positive"
        );

        Ok(Self {
            client,
            base_url,
            encoder,
            batch_size: config.batch_size,
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
        })
    }

    /// Scores one hardware batch. Holds a permit for the duration of the call.
    async fn score_one_batch(&self, encoded: &[EncodedChunk]) -> Result<Vec<GoalScores>> {
        let url = self
            .base_url
            .join("v1/logits")
            .context("failed to build logits URL")?;

        let permit = self
            .permits
            .acquire()
            .await
            .context("scorer semaphore closed")?;
        let response = self
            .client
            .post(url)
            .json(&LogitsRequest { instances: encoded })
            .send()
            .await
            .context("inference request failed")?
            .error_for_status()
            .context("inference backend returned an error status")?;
        let payload: LogitsResponse = response
            .json()
            .await
            .context("failed to decode inference response")?;
        drop(permit);

        ensure!(
            payload.logits.len() == encoded.len(),
            "inference backend returned {} rows for {} chunks",
            payload.logits.len(),
            encoded.len()
        );

        let mut rows = Vec::with_capacity(payload.logits.len());
        for logits in payload.logits {
            ensure!(
                logits.len() == GOAL_COUNT,
                "expected {GOAL_COUNT} logits per chunk, got {}",
                logits.len()
            );
            let mut row = [0.0f32; GOAL_COUNT];
            for (g, logit) in logits.iter().enumerate() {
                row[g] = round_probability(sigmoid(*logit));
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ChunkScorer for InferenceClient {
    async fn score_batch(&self, chunks: &[String]) -> Result<Vec<GoalScores>> {
        let mut scores = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let encoded = batch
                .iter()
                .map(|text| self.encoder.encode(text))
                .collect::<Result<Vec<_>>>()?;
            debug!(batch = encoded.len(), "scoring chunk batch");
            scores.extend(self.score_one_batch(&encoded).await?);
        }
        Ok(scores)
    }

    async fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("health")
            .context("failed to build health URL")?;
        self.client
            .get(url)
            .send()
            .await
            .context("inference health request failed")?
            .error_for_status()
            .context("inference backend is not healthy")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::scoring::encoding::tests::write_test_vocab;

    fn test_client(base_url: &str, batch_size: usize) -> (InferenceClient, tempfile::NamedTempFile) {
        let vocab = write_test_vocab();
        let client = InferenceClient::new(InferenceConfig {
            base_url: base_url.to_string(),
            vocab_path: vocab.path().to_path_buf(),
            batch_size,
            max_concurrency: 1,
            connect_timeout: Duration::from_millis(500),
            total_timeout: Duration::from_secs(2),
        })
        .expect("client builds");
        (client, vocab)
    }

    fn logits_row(poverty: f32) -> Vec<f32> {
        let mut row = vec![-8.0f32; GOAL_COUNT];
        row[0] = poverty;
        row
    }

    #[tokio::test]
    async fn applies_sigmoid_and_preserves_row_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/logits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logits": [logits_row(4.0), logits_row(-4.0)],
            })))
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 16);
        let scores = client
            .score_batch(&["poverty".to_string(), "water".to_string()])
            .await
            .expect("scores");

        assert_eq!(scores.len(), 2);
        assert!(scores[0][0] > 0.98, "sigmoid(4) should be high");
        assert!(scores[1][0] < 0.02, "sigmoid(-4) should be low");
        assert!(scores[0].iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[tokio::test]
    async fn splits_input_into_configured_batches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/logits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logits": [logits_row(1.0), logits_row(1.0)],
            })))
            .expect(2)
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 2);
        let chunks = vec!["poverty".to_string(); 4];
        let scores = client.score_batch(&chunks).await.expect("scores");
        assert_eq!(scores.len(), 4);
    }

    #[tokio::test]
    async fn backend_failure_propagates_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/logits"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 16);
        let result = client.score_batch(&["poverty".to_string()]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_row_count_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/logits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logits": [logits_row(1.0)],
            })))
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 16);
        let result = client
            .score_batch(&["poverty".to_string(), "hunger".to_string()])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sends_encoded_tensors_not_raw_text() {
        let server = MockServer::start().await;
        // First instance must carry an ids array starting with [CLS].
        Mock::given(method("POST"))
            .and(path("/v1/logits"))
            .and(body_partial_json(json!({
                "instances": [{"ids": []}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "logits": [logits_row(0.0)],
            })))
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 16);
        // body_partial_json([]) matches any array; the real assertion is that
        // the request deserializes against the instances/ids shape at all.
        let scores = client
            .score_batch(&["poverty".to_string()])
            .await
            .expect("scores");
        assert!((scores[0][0] - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn ping_checks_backend_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (client, _vocab) = test_client(&server.uri(), 16);
        client.ping().await.expect("healthy backend");
    }
}
