//! Chunked dispatch of items across a bounded pool of worker tasks.
//!
//! Chunks run strictly one after another with a pause in between. Inside a chunk every item gets
//! its own Tokio task, at most `max_concurrent` at a time, and results are collected in
//! completion order. Each task carries its own per-item timeout and is aborted if the run is
//! dropped; a task that times out or panics is turned into a failure outcome for its item.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::task::{JoinError, JoinHandle};

use super::types::{BatchError, Item, Outcome};
use super::worker::RetryingWorker;

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of items per chunk.
    pub chunk_size: usize,
    /// Maximum number of workers in flight within a chunk.
    pub max_concurrent: usize,
    /// Attempts allowed per item.
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts.
    pub rate_limit_delay: Duration,
    /// Pause between consecutive chunks.
    pub inter_chunk_delay: Duration,
    /// Upper bound on one item's processing across all attempts.
    pub item_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            max_concurrent: 5,
            max_retries: 3,
            rate_limit_delay: Duration::from_secs(1),
            inter_chunk_delay: Duration::from_secs(1),
            item_timeout: Duration::from_secs(60),
        }
    }
}

impl BatchConfig {
    /// Reject settings under which the scheduler could not make progress.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::InvalidChunkSize);
        }
        if self.max_concurrent == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        if self.max_retries == 0 {
            return Err(BatchError::InvalidRetryCount);
        }
        Ok(())
    }
}

/// Drives chunks of items through [`RetryingWorker`] tasks.
pub struct ChunkScheduler {
    worker: RetryingWorker,
    chunk_size: usize,
    max_concurrent: usize,
    inter_chunk_delay: Duration,
    item_timeout: Duration,
}

impl ChunkScheduler {
    /// Create a scheduler from validated settings.
    pub fn new(worker: RetryingWorker, config: &BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;
        Ok(Self {
            worker,
            chunk_size: config.chunk_size,
            max_concurrent: config.max_concurrent,
            inter_chunk_delay: config.inter_chunk_delay,
            item_timeout: config.item_timeout,
        })
    }

    /// Process every item and return one outcome per item, grouped by chunk.
    pub async fn run(&self, items: &[Item]) -> Vec<Outcome> {
        let chunk_count = items.len().div_ceil(self.chunk_size);
        let mut outcomes = Vec::with_capacity(items.len());

        for (index, chunk) in items.chunks(self.chunk_size).enumerate() {
            tracing::info!(
                chunk = index + 1,
                chunks = chunk_count,
                items = chunk.len(),
                "Processing chunk"
            );
            outcomes.extend(self.run_chunk(chunk).await);

            if index + 1 < chunk_count {
                tokio::time::sleep(self.inter_chunk_delay).await;
            }
        }

        outcomes
    }

    async fn run_chunk(&self, chunk: &[Item]) -> Vec<Outcome> {
        stream::iter(chunk.iter().cloned())
            .map(|item| self.dispatch(item))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await
    }

    async fn dispatch(&self, item: Item) -> Outcome {
        let worker = self.worker.clone();
        let task_item = item.clone();
        let item_timeout = self.item_timeout;
        let task = TaskGuard(tokio::spawn(async move {
            tokio::time::timeout(item_timeout, worker.process(&task_item)).await
        }));

        match task.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_elapsed)) => {
                tracing::error!(
                    item_id = ?item.id,
                    title = item.label(),
                    timeout_secs = item_timeout.as_secs_f64(),
                    "Summarization worker timed out"
                );
                Outcome::failure(
                    &item,
                    format!("timed out after {:.1}s", item_timeout.as_secs_f64()),
                    0,
                )
            }
            Err(join_error) => {
                tracing::error!(
                    item_id = ?item.id,
                    title = item.label(),
                    error = %join_error,
                    "Summarization worker aborted"
                );
                Outcome::failure(&item, format!("worker aborted: {join_error}"), 0)
            }
        }
    }
}

/// Aborts the spawned worker when the awaiting future is dropped.
struct TaskGuard<T>(JoinHandle<T>);

impl<T> Future for TaskGuard<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for TaskGuard<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
