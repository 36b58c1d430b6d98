//! Outbox records
//!
//! Notable outcomes (resolutions, compensations) are appended here so a
//! consumer can publish them later. The core only appends; flushing and
//! delivery belong to the embedding application.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A single appended record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxRecord {
    /// Topic the record belongs to
    pub topic: String,

    /// Record body
    pub payload: serde_json::Value,

    /// When the record was appended
    pub created_at: DateTime<Utc>,
}

/// Append-only sink for outcome records
pub trait OutboxSink: Send + Sync {
    /// Append a record under `topic`
    fn enqueue(&self, topic: &str, payload: serde_json::Value);
}

/// In-memory outbox, drainable in tests
#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    records: Mutex<Vec<OutboxRecord>>,
}

impl InMemoryOutbox {
    /// Create an empty outbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending records
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the outbox holds no records
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Remove and return all pending records
    pub fn drain(&self) -> Vec<OutboxRecord> {
        self.records.lock().drain(..).collect()
    }
}

impl OutboxSink for InMemoryOutbox {
    fn enqueue(&self, topic: &str, payload: serde_json::Value) {
        self.records.lock().push(OutboxRecord {
            topic: topic.to_string(),
            payload,
            created_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enqueue_and_drain() {
        let outbox = InMemoryOutbox::new();
        outbox.enqueue("label.resolved", json!({"key": "req-1", "value": "confirm"}));
        outbox.enqueue("label.compensated", json!({"key": "req-2"}));

        assert_eq!(outbox.len(), 2);

        let records = outbox.drain();
        assert_eq!(records[0].topic, "label.resolved");
        assert_eq!(records[0].payload["value"], "confirm");
        assert_eq!(records[1].topic, "label.compensated");
        assert!(outbox.is_empty());
    }
}
