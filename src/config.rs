use std::{env, net::SocketAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

/// Environment-driven configuration for the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    inference_base_url: String,
    model_dir: String,
    vocab_file: String,
    batch_size: NonZeroUsize,
    scorer_max_concurrency: NonZeroUsize,
    chunk_max_words: usize,
    chunk_min_letters: usize,
    smoothing_window: NonZeroUsize,
    confidence_level: f32,
    inference_connect_timeout: Duration,
    inference_total_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Loads and validates the worker configuration from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `INFERENCE_BASE_URL` is unset or any
    /// value fails to parse or validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let inference_base_url = env_var("INFERENCE_BASE_URL")?;
        let http_bind = parse_socket_addr("SDG_HTTP_BIND", "0.0.0.0:5000")?;

        // Tokenizer vocabulary location, resolved as MODEL_DIR/VOCAB_FILE.
        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string());
        let vocab_file =
            env::var("VOCAB_FILE").unwrap_or_else(|_| "bert-base-uncased-vocab.txt".to_string());

        // Scoring settings
        let batch_size = parse_non_zero_usize("BATCH_SIZE", 16)?;
        let scorer_max_concurrency = parse_non_zero_usize("SCORER_MAX_CONCURRENCY", 1)?;
        let inference_connect_timeout = parse_duration_ms("INFERENCE_CONNECT_TIMEOUT_MS", 3000)?;
        let inference_total_timeout = parse_duration_ms("INFERENCE_TOTAL_TIMEOUT_MS", 60000)?;

        // Pipeline settings
        let chunk_max_words = parse_usize("CHUNK_MAX_WORDS", 400)?;
        let chunk_min_letters = parse_usize("CHUNK_MIN_LETTERS", 5)?;
        let smoothing_window = parse_non_zero_usize("SMOOTHING_WINDOW", 5)?;
        let confidence_level = parse_unit_interval("CONFIDENCE_LEVEL", 0.5)?;

        Ok(Self {
            http_bind,
            inference_base_url,
            model_dir,
            vocab_file,
            batch_size,
            scorer_max_concurrency,
            chunk_max_words,
            chunk_min_letters,
            smoothing_window,
            confidence_level,
            inference_connect_timeout,
            inference_total_timeout,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn inference_base_url(&self) -> &str {
        &self.inference_base_url
    }

    #[must_use]
    pub fn model_dir(&self) -> &str {
        &self.model_dir
    }

    #[must_use]
    pub fn vocab_path(&self) -> PathBuf {
        PathBuf::from(&self.model_dir).join(&self.vocab_file)
    }

    #[must_use]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    #[must_use]
    pub fn scorer_max_concurrency(&self) -> NonZeroUsize {
        self.scorer_max_concurrency
    }

    #[must_use]
    pub fn chunk_max_words(&self) -> usize {
        self.chunk_max_words
    }

    #[must_use]
    pub fn chunk_min_letters(&self) -> usize {
        self.chunk_min_letters
    }

    #[must_use]
    pub fn smoothing_window(&self) -> NonZeroUsize {
        self.smoothing_window
    }

    #[must_use]
    pub fn confidence_level(&self) -> f32 {
        self.confidence_level
    }

    #[must_use]
    pub fn inference_connect_timeout(&self) -> Duration {
        self.inference_connect_timeout
    }

    #[must_use]
    pub fn inference_total_timeout(&self) -> Duration {
        self.inference_total_timeout
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<SocketAddr>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let value = parse_usize(name, default)?;
    NonZeroUsize::new(value).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("value must be greater than zero"),
    })
}

fn parse_duration_ms(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    Ok(Duration::from_millis(parsed))
}

fn parse_unit_interval(name: &'static str, default: f32) -> Result<f32, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<f32>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("value must be between 0 and 1"),
        });
    }
    Ok(parsed)
}
