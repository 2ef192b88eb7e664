//! Strategy selection between a primary provider and extractive summaries.

use async_trait::async_trait;

use crate::batch::Item;

use super::{ExtractiveSummarizer, SummarizeError, Summarizer, Summary, clean_text};

pub(crate) const TOO_SHORT_METHOD: &str = "original_too_short";

const MIN_SUMMARIZABLE_WORDS: usize = 30;

/// Tries the primary provider and falls back to [`ExtractiveSummarizer`] when it fails.
///
/// Bodies under 30 words after cleaning are returned verbatim without contacting a provider.
pub struct FallbackSummarizer {
    primary: Option<Box<dyn Summarizer>>,
    fallback: ExtractiveSummarizer,
}

impl FallbackSummarizer {
    /// Wrap `primary` with extractive fallback.
    pub fn new(primary: Box<dyn Summarizer>) -> Self {
        Self {
            primary: Some(primary),
            fallback: ExtractiveSummarizer,
        }
    }

    /// Extractive summaries only.
    pub fn extractive_only() -> Self {
        Self {
            primary: None,
            fallback: ExtractiveSummarizer,
        }
    }
}

#[async_trait]
impl Summarizer for FallbackSummarizer {
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError> {
        let cleaned = item
            .source_text()
            .map(clean_text)
            .ok_or(SummarizeError::NoContent)?;
        if cleaned.split_whitespace().count() < MIN_SUMMARIZABLE_WORDS {
            return Ok(Summary::new(cleaned, TOO_SHORT_METHOD));
        }

        if let Some(primary) = &self.primary {
            match primary.summarize(item).await {
                Ok(summary) => return Ok(summary),
                Err(error) => {
                    tracing::warn!(
                        item_id = ?item.id,
                        error = %error,
                        "Primary summarization failed; falling back to extractive"
                    );
                }
            }
        }

        self.fallback.summarize(item).await
    }
}
