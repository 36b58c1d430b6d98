//! Metrics sink boundary
//!
//! Purely observational: sinks never gate control flow and their results are
//! never inspected. Storage and export formatting belong to the embedding
//! application.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Counter and latency sink
pub trait MetricsSink: Send + Sync {
    /// Increment a counter by one
    fn incr(&self, name: &str, tags: &[(&str, &str)]);

    /// Record a latency or size observation
    fn observe(&self, name: &str, value: f64, tags: &[(&str, &str)]);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn incr(&self, _name: &str, _tags: &[(&str, &str)]) {}

    fn observe(&self, _name: &str, _value: f64, _tags: &[(&str, &str)]) {}
}

/// Recording sink for tests
///
/// Counters and observations are keyed as `name{k=v,...}` with tags sorted,
/// so assertions are stable regardless of tag order at the call site.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    counters: Mutex<HashMap<String, u64>>,
    observations: Mutex<HashMap<String, Vec<f64>>>,
}

impl RecordingMetrics {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, zero when never incremented
    pub fn counter(&self, name: &str, tags: &[(&str, &str)]) -> u64 {
        self.counters
            .lock()
            .get(&keyed(name, tags))
            .copied()
            .unwrap_or(0)
    }

    /// Recorded observations for a series
    pub fn observations(&self, name: &str, tags: &[(&str, &str)]) -> Vec<f64> {
        self.observations
            .lock()
            .get(&keyed(name, tags))
            .cloned()
            .unwrap_or_default()
    }
}

impl MetricsSink for RecordingMetrics {
    fn incr(&self, name: &str, tags: &[(&str, &str)]) {
        *self.counters.lock().entry(keyed(name, tags)).or_insert(0) += 1;
    }

    fn observe(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        self.observations
            .lock()
            .entry(keyed(name, tags))
            .or_default()
            .push(value);
    }
}

fn keyed(name: &str, tags: &[(&str, &str)]) -> String {
    if tags.is_empty() {
        return name.to_string();
    }

    let mut sorted: Vec<_> = tags.to_vec();
    sorted.sort();
    let rendered: Vec<String> = sorted.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{name}{{{}}}", rendered.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments() {
        let metrics = RecordingMetrics::new();
        metrics.incr("requests", &[]);
        metrics.incr("requests", &[]);

        assert_eq!(metrics.counter("requests", &[]), 2);
        assert_eq!(metrics.counter("other", &[]), 0);
    }

    #[test]
    fn test_tagged_series_are_distinct() {
        let metrics = RecordingMetrics::new();
        metrics.incr("failures", &[("error", "timeout")]);
        metrics.incr("failures", &[("error", "not_found")]);

        assert_eq!(metrics.counter("failures", &[("error", "timeout")]), 1);
        assert_eq!(metrics.counter("failures", &[("error", "not_found")]), 1);
    }

    #[test]
    fn test_tag_order_does_not_matter() {
        let metrics = RecordingMetrics::new();
        metrics.incr("requests", &[("a", "1"), ("b", "2")]);

        assert_eq!(metrics.counter("requests", &[("b", "2"), ("a", "1")]), 1);
    }

    #[test]
    fn test_observations_accumulate() {
        let metrics = RecordingMetrics::new();
        metrics.observe("latency_ms", 3.0, &[]);
        metrics.observe("latency_ms", 7.0, &[]);

        assert_eq!(metrics.observations("latency_ms", &[]), vec![3.0, 7.0]);
    }
}
