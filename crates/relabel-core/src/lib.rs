//! # Resilient Action-Label Resolution
//!
//! A resilience orchestrator around action-label resolution: it wraps a
//! fallible, possibly slow operation (resolving a label from an event-like
//! record, optionally normalized by an external call) with cross-cutting
//! reliability behavior.
//!
//! ## Features
//!
//! - **Idempotent memoization**: repeated request keys replay the stored
//!   response without re-executing side effects
//! - **Circuit breaker**: a three-state gate sheds load from a failing
//!   dependency, with a lazy cooldown and a single half-open trial
//! - **Retry with backoff**: exponential delays between attempts, bounded
//!   strictly by the configured attempt budget
//! - **Deadline guarding**: attempts race a deadline; late results are
//!   discarded, never surfaced
//! - **Compensation**: irrecoverable failures can trigger a caller-supplied
//!   compensating action, run through a saga primitive
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LabelService                          │
//! │  (validate, memoize, gate, race, retry, classify, notify)    │
//! └──────────────────────────────────────────────────────────────┘
//!         │                  │                       │
//!         ▼                  ▼                       ▼
//! ┌───────────────┐  ┌────────────────┐  ┌──────────────────────┐
//! │ resolve/read  │  │  reliability   │  │     persistence      │
//! │ (slot chain,  │  │ (breaker,      │  │ (idempotency store,  │
//! │  strategies)  │  │  retry, saga)  │  │  outbox)             │
//! └───────────────┘  └────────────────┘  └──────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use relabel_core::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = LabelService::new(
//!     ServiceConfig::default(),
//!     Arc::new(InMemoryIdempotencyStore::new()),
//! );
//!
//! let payload = json!({"srcElement": {"attributes": {"data-action": "confirm"}}});
//! let response = service
//!     .get_label(LabelRequest::new("req-1", payload))
//!     .await
//!     .unwrap();
//!
//! assert!(response.success);
//! assert_eq!(response.value, "confirm");
//! assert_eq!(response.path, "srcElement");
//! # }
//! ```

pub mod observe;
pub mod persistence;
pub mod reliability;
pub mod resolve;
pub mod service;

/// Prelude for common imports
pub mod prelude {
    pub use crate::observe::{MetricsSink, NoopMetrics, RecordingMetrics};
    pub use crate::persistence::{
        IdempotencyEntry, IdempotencyStore, InMemoryIdempotencyStore, InMemoryOutbox, OutboxSink,
        StoreError,
    };
    pub use crate::reliability::{
        run_saga, with_deadline, CircuitBreaker, CircuitBreakerConfig, CircuitState,
        DeadlineExceeded, RetryError, RetryExecutor, RetryPolicy, SagaOutcome,
    };
    pub use crate::resolve::{
        read, resolve, validate_request, Extraction, ReadStrategy, ResolvedTarget, TargetSlot,
        ValidationError,
    };
    pub use crate::service::{
        CompensationHook, FailureKind, LabelNormalizer, LabelRequest, LabelResponse, LabelService,
        RequestOptions, ServiceConfig,
    };
}

// Re-export key types at crate root
pub use observe::{MetricsSink, NoopMetrics};
pub use persistence::{IdempotencyStore, InMemoryIdempotencyStore, OutboxSink, StoreError};
pub use reliability::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, DeadlineExceeded, RetryError, RetryPolicy,
};
pub use resolve::{ReadStrategy, TargetSlot, ValidationError};
pub use service::{
    CompensationHook, FailureKind, LabelNormalizer, LabelRequest, LabelResponse, LabelService,
    ServiceConfig,
};
