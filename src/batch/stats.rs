//! Run-level statistics derived after all chunks complete.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::Outcome;

/// Aggregate counters and timing for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    /// Identifier of the run, also attached to its log lines.
    pub run_id: Uuid,
    /// Items handed to the scheduler.
    pub total_submitted: usize,
    /// Outcomes carrying a summary.
    pub success_count: usize,
    /// Outcomes carrying an error.
    pub failure_count: usize,
    /// When scheduling started.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// When the last chunk finished.
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    /// `end_time - start_time` in seconds.
    pub duration_seconds: f64,
    /// Submitted items per second, `0` for an instantaneous run.
    pub items_per_second: f64,
}

impl RunStats {
    /// Derive statistics from the outcomes of a run.
    pub fn aggregate(
        run_id: Uuid,
        total_submitted: usize,
        outcomes: &[Outcome],
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Self {
        let success_count = outcomes.iter().filter(|outcome| outcome.is_success()).count();
        let failure_count = outcomes.len() - success_count;
        let duration_seconds = (end_time - start_time).as_seconds_f64();
        let items_per_second = if duration_seconds > 0.0 {
            total_submitted as f64 / duration_seconds
        } else {
            0.0
        };

        Self {
            run_id,
            total_submitted,
            success_count,
            failure_count,
            start_time,
            end_time,
            duration_seconds,
            items_per_second,
        }
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Submitted: {}, Succeeded: {}, Failed: {}, Duration: {:.2}s ({:.2} items/s)",
            self.total_submitted,
            self.success_count,
            self.failure_count,
            self.duration_seconds,
            self.items_per_second
        )
    }
}
