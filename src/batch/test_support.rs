//! Scripted summarizers shared by the batch unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::summarization::{SummarizeError, Summarizer, Summary};

use super::types::Item;

/// Item with enough body text to pass the default eligibility rules.
pub(crate) fn item(id: &str) -> Item {
    Item {
        id: Some(id.to_string()),
        title: Some(format!("Item {id}")),
        content: Some(vec!["lorem"; 40].join(" ")),
        ..Item::default()
    }
}

/// Behaviour of one summarizer call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Succeed,
    Fail(&'static str),
    Unsuccessful,
    Empty,
    Sleep(Duration),
    Panic,
}

async fn perform(step: Step, item: &Item) -> Result<Summary, SummarizeError> {
    match step {
        Step::Succeed => Ok(Summary::new(format!("Summary of {}", item.label()), "scripted")),
        Step::Fail(reason) => Err(SummarizeError::GenerationFailed(reason.to_string())),
        Step::Unsuccessful => Err(SummarizeError::Unsuccessful(
            "provider reported failure".into(),
        )),
        Step::Empty => Ok(Summary::new(String::new(), "scripted")),
        Step::Sleep(duration) => {
            tokio::time::sleep(duration).await;
            Ok(Summary::new("Slow summary", "scripted"))
        }
        Step::Panic => panic!("scripted summarizer panic"),
    }
}

/// Plays back a sequence of steps, repeating the last one once exhausted.
pub(crate) struct ScriptedSummarizer {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    calls: AtomicUsize,
}

impl ScriptedSummarizer {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        let last = steps.last().copied().unwrap_or(Step::Succeed);
        Self {
            steps: Mutex::new(steps.into()),
            last,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn always(step: Step) -> Self {
        Self::new(vec![step])
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.steps.lock().expect("steps lock").pop_front();
        let step = next.unwrap_or(self.last);
        perform(step, item).await
    }
}

/// Chooses a step per item id and records call timing and overlap.
pub(crate) struct KeyedSummarizer {
    steps: HashMap<String, Step>,
    default_step: Step,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for KeyedSummarizer {
    fn default() -> Self {
        Self {
            steps: HashMap::new(),
            default_step: Step::Succeed,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl KeyedSummarizer {
    pub(crate) fn with(mut self, id: &str, step: Step) -> Self {
        self.steps.insert(id.to_string(), step);
        self
    }

    pub(crate) fn with_default(mut self, step: Step) -> Self {
        self.default_step = step;
        self
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Calls that have started and not yet finished or been cancelled.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    /// Item ids with the offset from `origin` at which they were first called.
    pub(crate) fn calls_since(&self, origin: Instant) -> Vec<(String, Duration)> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(|(id, at)| (id.clone(), at.saturating_duration_since(origin)))
            .collect()
    }
}

#[async_trait]
impl Summarizer for KeyedSummarizer {
    async fn summarize(&self, item: &Item) -> Result<Summary, SummarizeError> {
        let id = item.id.clone().unwrap_or_default();
        self.calls
            .lock()
            .expect("calls lock")
            .push((id.clone(), Instant::now()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        let _live = InFlight(&self.in_flight);

        let step = self.steps.get(&id).copied().unwrap_or(self.default_step);
        perform(step, item).await
    }
}

/// Decrements the in-flight counter when a call finishes or is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
