use std::sync::atomic::{AtomicU64, Ordering};

use crate::batch::RunStats;

/// Thread-safe counters describing batch activity since the service started.
#[derive(Default)]
pub struct ServiceMetrics {
    runs_completed: AtomicU64,
    items_submitted: AtomicU64,
    items_succeeded: AtomicU64,
    items_failed: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the statistics of one finished run into the counters.
    pub fn record_run(&self, stats: &RunStats) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.items_submitted
            .fetch_add(stats.total_submitted as u64, Ordering::Relaxed);
        self.items_succeeded
            .fetch_add(stats.success_count as u64, Ordering::Relaxed);
        self.items_failed
            .fetch_add(stats.failure_count as u64, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            items_submitted: self.items_submitted.load(Ordering::Relaxed),
            items_succeeded: self.items_succeeded.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of batch counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of batch runs that reached the scheduler.
    pub runs_completed: u64,
    /// Items handed to the scheduler across all runs.
    pub items_submitted: u64,
    /// Items that produced a summary.
    pub items_succeeded: u64,
    /// Items recorded as failures.
    pub items_failed: u64,
}
