//! Core data types and error definitions for the batch engine.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::summarization::Summary;

const UNKNOWN_TITLE: &str = "Unknown";

/// Faults that abort a whole run before any item is dispatched.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BatchError {
    /// Chunking configured an impossible slice size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// The worker pool would never admit a task.
    #[error("max concurrency must be greater than zero")]
    InvalidConcurrency,
    /// Items would never be attempted.
    #[error("max retries must be greater than zero")]
    InvalidRetryCount,
}

/// One article submitted for summarization.
///
/// Field names follow the feed payloads: snake_case with camelCase aliases. Identifiers may
/// arrive as strings or numbers and are normalized to strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Caller-supplied identifier echoed back on the outcome.
    #[serde(
        default,
        deserialize_with = "deserialize_item_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Headline of the article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full article body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Short description used when `content` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication timestamp as received (ISO 8601 / RFC 3339).
    #[serde(
        default,
        alias = "publishedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<String>,
    /// Summary already attached to the article, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Previously generated summary, consulted when `summary` is empty.
    #[serde(default, alias = "aiSummary", skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

impl Item {
    /// Title used in logs and outcomes.
    pub fn label(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(UNKNOWN_TITLE)
    }

    /// Existing summary text, preferring `summary` over `ai_summary`.
    pub fn existing_summary(&self) -> Option<&str> {
        non_empty(self.summary.as_deref()).or_else(|| non_empty(self.ai_summary.as_deref()))
    }

    /// Article body, preferring `content` over `description`.
    pub fn body(&self) -> Option<&str> {
        non_empty(self.content.as_deref()).or_else(|| non_empty(self.description.as_deref()))
    }

    /// Text handed to summarizers: the body, else the existing summary.
    pub fn source_text(&self) -> Option<&str> {
        self.body().or_else(|| non_empty(self.summary.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

fn deserialize_item_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(other) => Some(other.to_string()),
    })
}

/// Terminal result for one item entering the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Identifier of the originating item.
    pub item_id: Option<String>,
    /// Title of the originating item.
    pub original_title: String,
    /// When the outcome was produced.
    #[serde(with = "time::serde::rfc3339")]
    pub processed_at: OffsetDateTime,
    /// Attempts consumed; `0` when the worker never reported back.
    pub attempt: u32,
    /// Success or failure payload.
    #[serde(flatten)]
    pub result: OutcomeResult,
}

/// Payload of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeResult {
    /// A summary was produced.
    Success {
        /// Generated summary text.
        summary: String,
        /// Label describing how the summary was produced.
        method: String,
        /// Model used by the provider, when one was involved.
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    /// No summary could be produced.
    Failure {
        /// Human-readable reason.
        error: String,
    },
}

impl Outcome {
    /// Successful outcome for `item` produced on the given 1-based attempt.
    pub fn success(item: &Item, summary: Summary, attempt: u32) -> Self {
        Self {
            item_id: item.id.clone(),
            original_title: item.label().to_string(),
            processed_at: OffsetDateTime::now_utc(),
            attempt,
            result: OutcomeResult::Success {
                summary: summary.text,
                method: summary.method,
                model: summary.model,
            },
        }
    }

    /// Failed outcome for `item`.
    pub fn failure(item: &Item, error: impl Into<String>, attempt: u32) -> Self {
        Self {
            item_id: item.id.clone(),
            original_title: item.label().to_string(),
            processed_at: OffsetDateTime::now_utc(),
            attempt,
            result: OutcomeResult::Failure {
                error: error.into(),
            },
        }
    }

    /// Whether this outcome carries a summary.
    pub fn is_success(&self) -> bool {
        matches!(self.result, OutcomeResult::Success { .. })
    }

    /// Failure reason, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.result {
            OutcomeResult::Failure { error } => Some(error),
            OutcomeResult::Success { .. } => None,
        }
    }
}
