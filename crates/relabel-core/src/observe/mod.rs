//! Observability boundaries
//!
//! Structured logging goes through `tracing` directly; metrics go through
//! the [`MetricsSink`] trait so embedding applications own storage and
//! export formatting.

mod metrics;

pub use metrics::{MetricsSink, NoopMetrics, RecordingMetrics};
