//! Request-level service: caps input, filters, runs the engine, and records metrics.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::summarization::Summarizer;

use super::filter::{FilterRules, filter_items};
use super::stats::RunStats;
use super::types::{BatchError, Item, Outcome};
use super::{BatchConfig, BatchEngine};

/// Response produced for one batch request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Items accepted from the request after applying the request cap.
    pub original_count: usize,
    /// Items that passed the eligibility filter and were scheduled.
    pub processed_count: usize,
    /// One outcome per scheduled item.
    pub results: Vec<Outcome>,
    /// Run statistics; absent when nothing needed summarization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    /// Informational note for runs that did no work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the report was produced.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Abstraction over the batch pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait BatchApi: Send + Sync {
    /// Filter and summarize a batch of items.
    async fn summarize_batch(&self, items: Vec<Item>) -> Result<BatchReport, BatchError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates filtering and batch runs for incoming requests.
///
/// Construct the service once near process start and share it through an `Arc`; every request
/// gets its own engine run and statistics.
pub struct BatchService {
    engine: BatchEngine,
    rules: FilterRules,
    max_request_items: usize,
    filter_enabled: bool,
    metrics: Arc<ServiceMetrics>,
}

impl BatchService {
    /// Build a service around the summarizer and engine settings.
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        config: BatchConfig,
        rules: FilterRules,
        max_request_items: usize,
    ) -> Self {
        Self {
            engine: BatchEngine::new(summarizer, config),
            rules,
            max_request_items,
            filter_enabled: true,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }

    /// Schedule every accepted item, skipping the eligibility filter.
    pub fn without_filter(mut self) -> Self {
        self.filter_enabled = false;
        self
    }

    /// Cap, filter, and summarize a batch of items.
    pub async fn summarize_batch(&self, mut items: Vec<Item>) -> Result<BatchReport, BatchError> {
        if items.len() > self.max_request_items {
            tracing::warn!(
                received = items.len(),
                limit = self.max_request_items,
                "Limiting batch to the maximum request size"
            );
            items.truncate(self.max_request_items);
        }

        let eligible = if self.filter_enabled {
            filter_items(&items, &self.rules)
        } else {
            items.clone()
        };

        if eligible.is_empty() {
            return Ok(BatchReport {
                original_count: items.len(),
                processed_count: 0,
                results: Vec::new(),
                stats: None,
                message: Some("No articles needed summarization".into()),
                timestamp: OffsetDateTime::now_utc(),
            });
        }

        let run = self.engine.run(&eligible).await?;
        self.metrics.record_run(&run.stats);

        Ok(BatchReport {
            original_count: items.len(),
            processed_count: eligible.len(),
            results: run.outcomes,
            stats: Some(run.stats),
            message: None,
            timestamp: OffsetDateTime::now_utc(),
        })
    }

    /// Return the cumulative metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl BatchApi for BatchService {
    async fn summarize_batch(&self, items: Vec<Item>) -> Result<BatchReport, BatchError> {
        BatchService::summarize_batch(self, items).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        BatchService::metrics_snapshot(self)
    }
}
