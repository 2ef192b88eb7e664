//! Ollama-backed abstractive summaries.
//!
//! Requests go straight to the runtime's `/api/generate` endpoint with streaming disabled.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::batch::Item;

use super::{SummarizeError, Summarizer, Summary, clean_text};

pub(crate) const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
pub(crate) const OLLAMA_METHOD: &str = "ollama_model";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TITLE_OVERLAP_LIMIT: f64 = 0.8;

/// Summarizer that asks a local Ollama model for a short paragraph.
pub struct OllamaSummarizer {
    http: Client,
    base_url: String,
    model: String,
    max_words: usize,
}

impl OllamaSummarizer {
    /// Create a client for the runtime at `base_url`.
    pub fn new(base_url: String, model: String, max_words: usize) -> Result<Self, SummarizeError> {
        let http = Client::builder()
            .user_agent("rustydigest/summary")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| {
                SummarizeError::ProviderUnavailable(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self {
            http,
            base_url,
            model,
            max_words,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError> {
        let content = item
            .source_text()
            .map(clean_text)
            .filter(|text| !text.is_empty())
            .ok_or(SummarizeError::NoContent)?;

        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(item.label(), &content, self.max_words),
            "stream": false,
            "options": {
                // Low temperature keeps summaries close to the source.
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizeError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizeError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizeError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(SummarizeError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        let text = post_process(&body.response, item.label());
        Ok(Summary::new(text, OLLAMA_METHOD).with_model(self.model.clone()))
    }
}

fn build_prompt(title: &str, content: &str, max_words: usize) -> String {
    format!(
        "System: You summarize news articles into one neutral, factual paragraph. Avoid \
         speculation and do not repeat the headline. Return at most {max_words} words.\n\n\
         Title: {title}\n\nArticle:\n{content}\n"
    )
}

/// Tidy a model summary: prefer a sentence that does not just echo the title, capitalize the
/// first letter, and end with a period.
pub(crate) fn post_process(summary: &str, title: &str) -> String {
    let mut text = summary.trim().to_string();

    let title_words: HashSet<String> = title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if !title_words.is_empty() {
        let summary_words: HashSet<String> =
            text.split_whitespace().map(str::to_lowercase).collect();
        let overlap = title_words.intersection(&summary_words).count() as f64
            / title_words.len() as f64;
        let sentences: Vec<&str> = text.split('.').collect();
        if overlap > TITLE_OVERLAP_LIMIT && sentences.len() > 1 {
            let longest = sentences
                .iter()
                .copied()
                .max_by_key(|sentence| sentence.len())
                .unwrap_or_default();
            text = format!("{}.", longest.trim());
        }
    }

    let Some(first) = text.chars().next() else {
        return text;
    };
    let mut text = format!("{}{}", first.to_uppercase(), &text[first.len_utf8()..]);
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}
