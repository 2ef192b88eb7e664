//! Summarizer abstraction consumed by the batch engine, plus the shipped providers.
//!
//! The engine only sees [`Summarizer`]. The default stack wraps an optional Ollama client in a
//! [`FallbackSummarizer`] that answers from deterministic extractive summaries when the provider
//! is disabled or failing.

mod clean;
mod extractive;
mod fallback;
mod ollama;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::batch::Item;
use crate::config::{Config, SummarizationProvider};

pub use clean::clean_text;
pub use extractive::{ExtractiveSummarizer, build_extractive_summary};
pub use fallback::FallbackSummarizer;
pub use ollama::OllamaSummarizer;

/// Errors surfaced by a single summarization attempt. All of them are retryable.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The item carried no text to summarize.
    #[error("No content to summarize")]
    NoContent,
    /// Provider was explicitly disabled or unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// Provider answered but reported the summary as unsuccessful.
    #[error("Summarization unsuccessful: {0}")]
    Unsuccessful(String),
}

/// A produced summary and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Summary text.
    pub text: String,
    /// Label for the technique, e.g. `extractive_fallback`.
    pub method: String,
    /// Model identifier when a model produced the text.
    pub model: Option<String>,
}

impl Summary {
    /// Summary produced without a model.
    pub fn new(text: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            method: method.into(),
            model: None,
        }
    }

    /// Attach the model that produced the text.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Reject summaries without text.
    pub fn validated(self) -> Result<Self, SummarizeError> {
        if self.text.trim().is_empty() {
            return Err(SummarizeError::Unsuccessful(format!(
                "{} returned an empty summary",
                self.method
            )));
        }
        Ok(self)
    }
}

/// The single operation the batch engine depends on.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one item.
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError>;
}

/// Build the summarizer stack described by configuration.
pub fn get_summarizer(config: &Config) -> Result<Arc<dyn Summarizer>, SummarizeError> {
    let summarizer = match config.summarization_provider {
        SummarizationProvider::None => FallbackSummarizer::extractive_only(),
        SummarizationProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_URL.to_string());
            let client = OllamaSummarizer::new(
                base_url,
                config.summarization_model.clone(),
                config.summary_max_words,
            )?;
            FallbackSummarizer::new(Box::new(client))
        }
    };
    tracing::info!(provider = ?config.summarization_provider, "Summarizer initialized");
    Ok(Arc::new(summarizer))
}
