#![deny(missing_docs)]

//! Core library for the Rusty Digest batch summarization service.

/// HTTP routing and REST handlers.
pub mod api;
/// Batch orchestration: eligibility filtering, retries, chunk scheduling, and run statistics.
pub mod batch;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Cumulative service metrics.
pub mod metrics;
/// Summarizer abstraction and provider adapters.
pub mod summarization;
