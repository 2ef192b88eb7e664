//! Batch orchestration: eligibility filtering, retrying workers, chunk scheduling, and stats.
//!
//! Callers filter first and then hand the survivors to [`BatchEngine::run`]:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use rustydigest::batch::{BatchConfig, BatchEngine, FilterRules, filter_items};
//! # use rustydigest::summarization::ExtractiveSummarizer;
//! # async fn demo(items: Vec<rustydigest::batch::Item>) -> Result<(), rustydigest::batch::BatchError> {
//! let eligible = filter_items(&items, &FilterRules::default());
//! let engine = BatchEngine::new(Arc::new(ExtractiveSummarizer), BatchConfig::default());
//! let run = engine.run(&eligible).await?;
//! println!("{}", run.stats);
//! # Ok(())
//! # }
//! ```

mod filter;
mod scheduler;
mod service;
mod stats;
mod types;
mod worker;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

use crate::summarization::Summarizer;

pub use filter::{Eligibility, FilterRules, eligibility, filter_items, filter_items_at};
pub use scheduler::{BatchConfig, ChunkScheduler};
pub use service::{BatchApi, BatchReport, BatchService};
pub use stats::RunStats;
pub use types::{BatchError, Item, Outcome, OutcomeResult};
pub use worker::{RetryingWorker, backoff};

/// Outcomes and statistics of one engine invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRun {
    /// One outcome per submitted item, in completion order within each chunk.
    pub outcomes: Vec<Outcome>,
    /// Aggregate statistics for the run.
    pub stats: RunStats,
}

/// Runs already-filtered items through the scheduler and aggregates the result.
pub struct BatchEngine {
    summarizer: Arc<dyn Summarizer>,
    config: BatchConfig,
}

impl BatchEngine {
    /// Build an engine around the summarization operation.
    pub fn new(summarizer: Arc<dyn Summarizer>, config: BatchConfig) -> Self {
        Self { summarizer, config }
    }

    /// Settings used for every run.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Summarize every item, returning exactly one outcome per item plus fresh statistics.
    ///
    /// Item-level failures never surface as `Err`; only invalid settings abort the run.
    pub async fn run(&self, items: &[Item]) -> Result<BatchRun, BatchError> {
        let worker = RetryingWorker::new(
            self.summarizer.clone(),
            self.config.max_retries,
            self.config.rate_limit_delay,
        );
        let scheduler = ChunkScheduler::new(worker, &self.config)?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("batch_run", %run_id);
        async move {
            let start_time = OffsetDateTime::now_utc();
            tracing::info!(items = items.len(), "Starting batch run");

            let outcomes = scheduler.run(items).await;
            debug_assert_eq!(outcomes.len(), items.len());

            let end_time = OffsetDateTime::now_utc();
            let stats = RunStats::aggregate(run_id, items.len(), &outcomes, start_time, end_time);
            tracing::info!(
                succeeded = stats.success_count,
                failed = stats.failure_count,
                duration_seconds = stats.duration_seconds,
                "Batch run completed"
            );

            Ok(BatchRun { outcomes, stats })
        }
        .instrument(span)
        .await
    }
}
