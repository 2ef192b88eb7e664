//! Per-item retry loop with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use crate::summarization::{Summarizer, Summary};

use super::types::{Item, Outcome};

/// Delay before the attempt following `attempt_index` (0-based): `2^attempt_index * base`.
pub fn backoff(attempt_index: u32, base: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt_index))
}

/// Wraps the summarizer with bounded retries. Cloning shares the summarizer only.
#[derive(Clone)]
pub struct RetryingWorker {
    summarizer: Arc<dyn Summarizer>,
    max_retries: u32,
    rate_limit_delay: Duration,
}

impl RetryingWorker {
    /// Build a worker that allows `max_retries` attempts per item.
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        max_retries: u32,
        rate_limit_delay: Duration,
    ) -> Self {
        Self {
            summarizer,
            max_retries,
            rate_limit_delay,
        }
    }

    /// Summarize `item`, retrying failures, and return exactly one outcome.
    ///
    /// Provider errors and empty summaries count as failed attempts. Between failed attempts the
    /// worker sleeps for [`backoff`] of the attempt index. Exhausted retries yield a failure
    /// outcome rather than an error.
    pub async fn process(&self, item: &Item) -> Outcome {
        let mut last_error = String::from("no attempts were made");

        for attempt_index in 0..self.max_retries {
            let attempt = attempt_index + 1;
            let result = self
                .summarizer
                .summarize(item)
                .await
                .and_then(Summary::validated);

            match result {
                Ok(summary) => return Outcome::success(item, summary, attempt),
                Err(error) => {
                    tracing::warn!(
                        item_id = ?item.id,
                        title = item.label(),
                        attempt,
                        error = %error,
                        "Summarization attempt failed"
                    );
                    last_error = error.to_string();
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(backoff(attempt_index, self.rate_limit_delay)).await;
            }
        }

        Outcome::failure(
            item,
            format!("Failed after {} attempts: {last_error}", self.max_retries),
            self.max_retries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::test_support::{ScriptedSummarizer, Step, item};
    use tokio::time::Instant;

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff(0, base), Duration::from_secs(1));
        assert_eq!(backoff(1, base), Duration::from_secs(2));
        assert_eq!(backoff(2, base), Duration::from_secs(4));
        assert_eq!(
            backoff(3, Duration::from_millis(250)),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn backoff_saturates() {
        assert_eq!(
            backoff(40, Duration::from_secs(1)),
            Duration::from_secs(u64::from(u32::MAX))
        );
        assert_eq!(backoff(2, Duration::MAX), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_two_backoffs() {
        let summarizer = Arc::new(ScriptedSummarizer::new(vec![
            Step::Fail("provider down"),
            Step::Unsuccessful,
            Step::Succeed,
        ]));
        let worker = RetryingWorker::new(summarizer.clone(), 3, Duration::from_secs(1));

        let started = Instant::now();
        let outcome = worker.process(&item("1")).await;

        assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
        assert_eq!(outcome.attempt, 3);
        assert_eq!(outcome.item_id.as_deref(), Some("1"));
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(summarizer.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let summarizer = Arc::new(ScriptedSummarizer::always(Step::Fail("boom")));
        let worker = RetryingWorker::new(summarizer.clone(), 3, Duration::from_secs(1));

        let started = Instant::now();
        let outcome = worker.process(&item("9")).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.attempt, 3);
        assert_eq!(outcome.original_title, "Item 9");
        let error = outcome.error().expect("failure reason");
        assert!(error.contains("3 attempts"), "{error}");
        assert!(error.contains("boom"), "{error}");
        assert_eq!(summarizer.calls(), 3);
        // No sleep after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_summary_is_retried() {
        let summarizer = Arc::new(ScriptedSummarizer::new(vec![Step::Empty, Step::Succeed]));
        let worker = RetryingWorker::new(summarizer.clone(), 3, Duration::from_millis(100));

        let outcome = worker.process(&item("2")).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempt, 2);
        assert_eq!(summarizer.calls(), 2);
    }

    #[tokio::test]
    async fn first_success_makes_one_call() {
        let summarizer = Arc::new(ScriptedSummarizer::always(Step::Succeed));
        let worker = RetryingWorker::new(summarizer.clone(), 3, Duration::from_secs(1));

        let outcome = worker.process(&item("3")).await;

        assert_eq!(outcome.attempt, 1);
        assert_eq!(summarizer.calls(), 1);
    }
}
