//! Request type and per-call overrides

use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::reliability::RetryPolicy;

/// Per-call overrides, falling back to [`ServiceConfig`](super::ServiceConfig)
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Override the overall deadline for this call
    pub deadline: Option<Duration>,

    /// Override the retry policy for this call
    pub retry: Option<RetryPolicy>,

    /// Caller-supplied trace identifier
    pub trace_id: Option<Uuid>,
}

/// A single resolution request
///
/// The key scopes idempotent memoization: repeated requests with the same
/// key replay the first stored response instead of re-running the pipeline.
/// Immutable once issued.
#[derive(Debug, Clone)]
pub struct LabelRequest {
    /// Idempotency key
    pub key: String,

    /// Opaque event-like record
    pub payload: Value,

    /// Attribute to read; the configured default when absent
    pub attribute: Option<String>,

    /// Per-call overrides
    pub options: RequestOptions,
}

impl LabelRequest {
    /// Create a request with a caller-supplied idempotency key
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self {
            key: key.into(),
            payload,
            attribute: None,
            options: RequestOptions::default(),
        }
    }

    /// Create a request with a generated idempotency key
    pub fn anonymous(payload: Value) -> Self {
        Self::new(Uuid::now_v7().to_string(), payload)
    }

    /// Set the attribute to read
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Set a per-call deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.options.deadline = Some(deadline);
        self
    }

    /// Set a per-call retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.options.retry = Some(retry);
        self
    }

    /// Set a caller-supplied trace identifier
    pub fn with_trace_id(mut self, trace_id: Uuid) -> Self {
        self.options.trace_id = Some(trace_id);
        self
    }
}
