//! Eligibility rules deciding which items still need a summary.
//!
//! Rules are evaluated in order and the first match excludes the item:
//!
//! 1. An existing summary longer than [`FilterRules::min_summary_chars`] (trimmed).
//! 2. Missing content, or fewer than [`FilterRules::min_content_words`] whitespace tokens.
//! 3. A parseable publication timestamp older than [`FilterRules::max_age`].
//!
//! Unparseable timestamps never exclude an item.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime};

use super::types::Item;

/// Thresholds applied by the eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRules {
    /// Existing summaries longer than this many characters are kept as-is.
    pub min_summary_chars: usize,
    /// Bodies with fewer whitespace-separated tokens are too short to summarize.
    pub min_content_words: usize,
    /// Items published longer ago than this are skipped.
    pub max_age: Duration,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            min_summary_chars: 50,
            min_content_words: 30,
            max_age: Duration::days(7),
        }
    }
}

/// Verdict for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The item should be summarized.
    Eligible,
    /// The item already carries a usable summary.
    HasSummary,
    /// The item has no body or too few words.
    InsufficientContent,
    /// The item was published outside the freshness window.
    Stale,
}

/// Classify a single item against `rules` at instant `now`.
pub fn eligibility(item: &Item, rules: &FilterRules, now: OffsetDateTime) -> Eligibility {
    if item
        .existing_summary()
        .is_some_and(|summary| summary.trim().chars().count() > rules.min_summary_chars)
    {
        return Eligibility::HasSummary;
    }

    let word_count = item
        .body()
        .map(|body| body.split_whitespace().count())
        .unwrap_or(0);
    if word_count < rules.min_content_words {
        return Eligibility::InsufficientContent;
    }

    let published = item.published_at.as_deref().and_then(parse_published_at);
    if published.is_some_and(|published| now - published > rules.max_age) {
        return Eligibility::Stale;
    }

    Eligibility::Eligible
}

/// Return the items that need summarization, preserving their relative order.
pub fn filter_items(items: &[Item], rules: &FilterRules) -> Vec<Item> {
    filter_items_at(items, rules, OffsetDateTime::now_utc())
}

/// [`filter_items`] evaluated at a fixed instant.
pub fn filter_items_at(items: &[Item], rules: &FilterRules, now: OffsetDateTime) -> Vec<Item> {
    let filtered: Vec<Item> = items
        .iter()
        .filter(|item| {
            let verdict = eligibility(item, rules, now);
            if verdict != Eligibility::Eligible {
                tracing::debug!(item_id = ?item.id, title = item.label(), ?verdict, "Item skipped");
            }
            verdict == Eligibility::Eligible
        })
        .cloned()
        .collect();

    tracing::info!(
        submitted = items.len(),
        eligible = filtered.len(),
        "Filtered items needing summarization"
    );
    filtered
}

/// Parse a publication timestamp.
///
/// Accepts RFC 3339 and offset-less ISO 8601 date-times or dates; the latter are read as UTC.
pub(crate) fn parse_published_at(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];
    if let Some(parsed) = naive_formats
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
    {
        return Some(parsed.assume_utc());
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}
