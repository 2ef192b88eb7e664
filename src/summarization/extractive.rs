//! Deterministic sentence-picking summaries that need no provider.

use async_trait::async_trait;

use crate::batch::Item;

use super::{SummarizeError, Summarizer, Summary, clean_text};

pub(crate) const EXTRACTIVE_METHOD: &str = "extractive_fallback";

const MIN_SENTENCE_CHARS: usize = 20;
const MAX_PREFIX_CHARS: usize = 150;

/// Summarizer that lifts the leading informative sentences out of the article body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError> {
        let cleaned = item
            .source_text()
            .map(clean_text)
            .filter(|text| !text.is_empty())
            .ok_or(SummarizeError::NoContent)?;
        Ok(Summary::new(
            build_extractive_summary(&cleaned),
            EXTRACTIVE_METHOD,
        ))
    }
}

/// Pick sentences longer than 20 characters: the first two when at least three exist, otherwise
/// the first one. Without any such sentence the first 150 characters are used.
pub fn build_extractive_summary(content: &str) -> String {
    let sentences: Vec<&str> = content
        .split('.')
        .map(str::trim)
        .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
        .collect();

    match sentences.as_slice() {
        [first, second, _, ..] => format!("{first}. {second}."),
        [first, ..] => format!("{first}."),
        [] if content.chars().count() > MAX_PREFIX_CHARS => {
            let prefix: String = content.chars().take(MAX_PREFIX_CHARS).collect();
            format!("{prefix}...")
        }
        [] => content.to_string(),
    }
}
