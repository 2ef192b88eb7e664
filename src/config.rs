use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::batch::{BatchConfig, FilterRules};

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the digest server and batch CLI.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Number of items processed per chunk.
    pub batch_size: usize,
    /// Maximum number of summarization calls in flight within a chunk.
    pub max_concurrent: usize,
    /// Attempts allowed per item before it is recorded as a failure.
    pub max_retries: u32,
    /// Base delay used for backoff and for the pause between chunks, in milliseconds.
    pub rate_limit_delay_ms: u64,
    /// Upper bound on one item's processing across all attempts, in seconds.
    pub item_timeout_secs: u64,
    /// Items accepted per request; extra items are dropped with a warning.
    pub max_request_items: usize,
    /// Backend used to produce abstractive summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the provider.
    pub summarization_model: String,
    /// Word budget requested from the provider.
    pub summary_max_words: usize,
    /// Optional override for the Ollama base URL.
    pub ollama_url: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Extractive summaries only; no remote calls.
    None,
    /// Local Ollama runtime with extractive fallback.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            batch_size: parse_or("SUMMARIZE_BATCH_SIZE", 10)?,
            max_concurrent: parse_or("SUMMARIZE_CONCURRENT_REQUESTS", 5)?,
            max_retries: parse_or("SUMMARIZE_MAX_RETRIES", 3)?,
            rate_limit_delay_ms: parse_or("SUMMARIZE_RATE_LIMIT_DELAY_MS", 1000)?,
            item_timeout_secs: parse_or("SUMMARIZE_ITEM_TIMEOUT_SECS", 60)?,
            max_request_items: parse_or("SUMMARIZE_MAX_REQUEST_ITEMS", 50)?,
            summarization_provider: load_env_optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into())
                    })
                })
                .transpose()?
                .unwrap_or(SummarizationProvider::None),
            summarization_model: load_env_optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| "llama3.2".to_string()),
            summary_max_words: parse_or("SUMMARY_MAX_WORDS", 80)?,
            ollama_url: load_env_optional("OLLAMA_URL"),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }

    /// Engine settings derived from this configuration.
    pub fn batch_config(&self) -> BatchConfig {
        let rate_limit_delay = Duration::from_millis(self.rate_limit_delay_ms);
        BatchConfig {
            chunk_size: self.batch_size,
            max_concurrent: self.max_concurrent,
            max_retries: self.max_retries,
            rate_limit_delay,
            inter_chunk_delay: rate_limit_delay,
            item_timeout: Duration::from_secs(self.item_timeout_secs),
        }
    }

    /// Eligibility thresholds; not currently configurable from the environment.
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules::default()
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "extractive" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Merge variables from a `.env` file into the process environment, if one exists.
///
/// Existing variables win over the file. Call before logging is set up so `RUST_LOG` and
/// `DIGEST_LOG_FILE` can come from `.env` as well.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<(), ConfigError> {
    let config = Config::from_env()?;
    tracing::debug!(
        batch_size = config.batch_size,
        max_concurrent = config.max_concurrent,
        max_retries = config.max_retries,
        provider = ?config.summarization_provider,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    // A second initialization keeps the first value.
    let _ = CONFIG.set(config);
    Ok(())
}
