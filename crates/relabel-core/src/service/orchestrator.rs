//! Request pipeline
//!
//! The `LabelService` composes idempotent memoization, circuit breaking,
//! deadline guarding, retry and the resolve/read chain into a single
//! pipeline with a uniform response envelope. Expected failures never
//! surface as errors; only a malformed request returns `Err`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::observe::{MetricsSink, NoopMetrics};
use crate::persistence::{IdempotencyStore, OutboxSink};
use crate::reliability::{
    run_saga, with_deadline, CircuitBreaker, DeadlineExceeded, RetryError, RetryExecutor,
};
use crate::resolve::{self, ReadStrategy, TargetSlot, ValidationError};

use super::config::ServiceConfig;
use super::envelope::{FailureKind, LabelResponse};
use super::fallback::FallbackCache;
use super::hooks::{CompensationHook, LabelNormalizer};
use super::request::LabelRequest;

/// Failure of a single pipeline attempt
#[derive(Debug, Error)]
enum AttemptError {
    /// No slot held a structural candidate
    #[error("no target resolved")]
    NoTarget,

    /// The external normalization call failed
    #[error("normalization failed: {0}")]
    Normalize(String),
}

/// Failure of the whole guarded pipeline
#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Deadline(#[from] DeadlineExceeded),

    #[error(transparent)]
    Retry(#[from] RetryError<AttemptError>),
}

/// Value produced by one successful attempt
#[derive(Debug)]
struct AttemptOutcome {
    value: String,
    slot: TargetSlot,
    strategy: ReadStrategy,
}

/// Resilient action-label resolution service
///
/// Long-lived and shareable across concurrent requests. The breaker, the
/// idempotency store, the fallback cache and the outbox are owned here and
/// mutated only through their own synchronized methods.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use relabel_core::persistence::InMemoryIdempotencyStore;
/// use relabel_core::service::{LabelRequest, LabelService, ServiceConfig};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = LabelService::new(
///     ServiceConfig::default(),
///     Arc::new(InMemoryIdempotencyStore::new()),
/// );
///
/// let payload = json!({"target": {"attributes": {"data-action": "confirm"}}});
/// let response = service
///     .get_label(LabelRequest::new("req-1", payload))
///     .await
///     .unwrap();
///
/// assert!(response.success);
/// assert_eq!(response.value, "confirm");
/// # }
/// ```
pub struct LabelService {
    config: ServiceConfig,
    breaker: CircuitBreaker,
    store: Arc<dyn IdempotencyStore>,
    fallback: FallbackCache,
    normalizer: Option<Arc<dyn LabelNormalizer>>,
    compensation: Option<Arc<dyn CompensationHook>>,
    outbox: Option<Arc<dyn OutboxSink>>,
    metrics: Arc<dyn MetricsSink>,
}

impl LabelService {
    /// Create a service over the given store
    pub fn new(config: ServiceConfig, store: Arc<dyn IdempotencyStore>) -> Self {
        let breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        let fallback = FallbackCache::new(config.fallback_ttl);
        Self {
            config,
            breaker,
            store,
            fallback,
            normalizer: None,
            compensation: None,
            outbox: None,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Attach an external normalization step
    pub fn with_normalizer(mut self, normalizer: Arc<dyn LabelNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Attach a compensating action for irrecoverable failures
    pub fn with_compensation(mut self, hook: Arc<dyn CompensationHook>) -> Self {
        self.compensation = Some(hook);
        self
    }

    /// Attach an outbox sink
    pub fn with_outbox(mut self, outbox: Arc<dyn OutboxSink>) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Attach a metrics sink
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get the service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get the breaker guarding this service
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Resolve a label for `request`.
    ///
    /// Returns `Err` only for malformed requests; every other failure mode
    /// is a valued envelope. Calling twice with the same key and payload
    /// yields identical `value`, `path`, `success` and `error` (latency and
    /// trace id are per-call), and the wrapped operation's side effects fire
    /// at most once per key.
    #[instrument(skip(self, request), fields(key = %request.key))]
    pub async fn get_label(&self, request: LabelRequest) -> Result<LabelResponse, ValidationError> {
        let started = Instant::now();
        let trace_id = request.options.trace_id.unwrap_or_else(Uuid::now_v7);
        let attribute = request
            .attribute
            .clone()
            .unwrap_or_else(|| self.config.default_attribute.clone());

        if let Err(error) = resolve::validate_request(&request.payload, &attribute) {
            warn!(error = %error, "malformed request");
            let kind = FailureKind::Validation.to_string();
            self.metrics
                .incr("label_requests_failed", &[("error", kind.as_str())]);
            return Err(error);
        }

        match self.store.get(&request.key).await {
            Ok(Some(entry)) => {
                debug!("idempotent replay");
                self.metrics.incr("label_idempotent_replays", &[]);
                let mut envelope = entry.envelope;
                envelope.trace_id = trace_id;
                envelope.latency = started.elapsed();
                return Ok(envelope);
            }
            Ok(None) => {}
            Err(error) => {
                // A broken store degrades to a fresh run, not a failed request
                warn!(error = %error, "idempotency lookup failed");
            }
        }

        if !self.breaker.can_attempt() {
            return Ok(self.degraded(&request, started, trace_id));
        }

        let deadline = request.options.deadline.unwrap_or(self.config.deadline);
        let policy = request
            .options
            .retry
            .clone()
            .unwrap_or_else(|| self.config.retry.clone());
        let executor = RetryExecutor::new(policy);
        let payload = &request.payload;

        let pipeline = async {
            let raced = with_deadline(
                deadline,
                executor.run(
                    |attempt| {
                        if attempt > 0 {
                            self.metrics.incr("label_retry_attempts", &[]);
                        }
                        self.attempt(payload, &attribute, deadline)
                    },
                    |outcome: &AttemptOutcome| outcome.value.is_empty(),
                ),
            )
            .await;

            match raced {
                Ok(Ok(outcome)) => Ok(outcome),
                Ok(Err(error)) => Err(PipelineError::from(error)),
                Err(error) => Err(PipelineError::from(error)),
            }
        };

        match &self.compensation {
            None => match pipeline.await {
                Ok(outcome) => Ok(self.finish_success(&request, outcome, started, trace_id).await),
                Err(error) => {
                    let (kind, reason) = classify(&error);
                    Ok(self.finish_failure(&request, kind, reason, started, trace_id))
                }
            },
            Some(hook) => {
                let saga = run_saga(pipeline, hook.compensate(&request.key)).await;
                if let Some(outcome) = saga.result {
                    return Ok(self.finish_success(&request, outcome, started, trace_id).await);
                }

                let (kind, reason) = saga.error.as_ref().map(classify).unwrap_or_else(|| {
                    (FailureKind::Unknown, "pipeline produced no outcome".to_string())
                });

                let mut envelope = self.finish_failure(&request, kind, reason, started, trace_id);
                envelope.compensated = Some(saga.compensated);

                if let Some(comp_error) = saga.compensation_error {
                    self.metrics.incr("label_compensation_failures", &[]);
                    let reason = envelope.reason.take().unwrap_or_default();
                    envelope.reason = Some(format!("{reason}; compensation failed: {comp_error}"));
                } else {
                    self.metrics.incr("label_compensations", &[]);
                    if let Some(outbox) = &self.outbox {
                        outbox.enqueue("label.compensated", json!({"key": request.key}));
                    }
                }

                Ok(envelope)
            }
        }
    }

    /// One attempt: resolve, read, optionally normalize.
    async fn attempt(
        &self,
        payload: &Value,
        attribute: &str,
        deadline: Duration,
    ) -> Result<AttemptOutcome, AttemptError> {
        // Yield so an already-elapsed deadline can win the race before any work
        tokio::task::yield_now().await;

        let resolved = resolve::resolve(payload);
        let Some(candidate) = resolved.candidate else {
            return Err(AttemptError::NoTarget);
        };

        let mut extraction = resolve::read(candidate, attribute);
        let mut slot = resolved.slot;

        // Delegation: a primary target without the label defers to currentTarget
        if !extraction.matched && slot == TargetSlot::Target {
            if let Some(delegate) = payload.get("currentTarget").filter(|v| v.is_object()) {
                let delegated = resolve::read(delegate, attribute);
                if delegated.matched {
                    extraction = delegated;
                    slot = TargetSlot::CurrentTarget;
                }
            }
        }

        if !extraction.matched {
            debug!(slot = %slot, attribute, "no value for attribute");
            return Ok(AttemptOutcome {
                value: String::new(),
                slot,
                strategy: ReadStrategy::None,
            });
        }

        let value = match &self.normalizer {
            Some(normalizer) => normalizer
                .normalize(&extraction.value, deadline)
                .await
                .map_err(|error| AttemptError::Normalize(error.to_string()))?,
            None => extraction.value,
        };

        Ok(AttemptOutcome {
            value,
            slot,
            strategy: extraction.strategy,
        })
    }

    /// Record success, persist, refresh the fallback cache, notify.
    async fn finish_success(
        &self,
        request: &LabelRequest,
        outcome: AttemptOutcome,
        started: Instant,
        trace_id: Uuid,
    ) -> LabelResponse {
        self.breaker.record_success();

        let envelope = LabelResponse::success(
            outcome.value,
            outcome.slot.to_string(),
            started.elapsed(),
            trace_id,
        );

        if let Err(error) = self.store.set(&request.key, envelope.clone()).await {
            warn!(error = %error, "idempotency write failed");
        }

        if !envelope.value.is_empty() {
            if let Some(element_id) = element_id(&request.payload) {
                self.fallback.put(&element_id, &envelope.value);
            }
            if let Some(outbox) = &self.outbox {
                outbox.enqueue(
                    "label.resolved",
                    json!({
                        "key": request.key,
                        "value": envelope.value,
                        "path": envelope.path,
                    }),
                );
            }
        }

        info!(path = %envelope.path, strategy = %outcome.strategy, "label resolved");
        self.metrics
            .incr("label_requests_total", &[("outcome", "success")]);
        self.metrics.observe(
            "label_request_latency_ms",
            envelope.latency.as_secs_f64() * 1000.0,
            &[],
        );

        envelope
    }

    /// Record failure and build the failure envelope.
    fn finish_failure(
        &self,
        request: &LabelRequest,
        kind: FailureKind,
        reason: String,
        started: Instant,
        trace_id: Uuid,
    ) -> LabelResponse {
        self.breaker.record_failure();

        warn!(key = %request.key, kind = %kind, reason = %reason, "label resolution failed");
        let kind_name = kind.to_string();
        self.metrics
            .incr("label_requests_total", &[("outcome", "failure")]);
        self.metrics
            .incr("label_requests_failed", &[("error", kind_name.as_str())]);
        if kind == FailureKind::Timeout {
            self.metrics.incr("label_timeouts", &[]);
        }

        LabelResponse::failure(kind, reason, "none".to_string(), started.elapsed(), trace_id)
    }

    /// Degraded response while the gate is denying attempts.
    ///
    /// Serves the time-boxed fallback value when one is cached for the
    /// payload's element; never invokes the wrapped operation.
    fn degraded(&self, request: &LabelRequest, started: Instant, trace_id: Uuid) -> LabelResponse {
        let fallback = element_id(&request.payload).and_then(|id| self.fallback.get(&id));
        let served = fallback.is_some();

        warn!(served_fallback = served, "circuit open, degraded response");
        self.metrics.incr(
            "label_circuit_open_fallbacks",
            &[("served", if served { "true" } else { "false" })],
        );

        let (value, reason) = match fallback {
            Some(value) => (value, "circuit open; served cached fallback".to_string()),
            None => (String::new(), "circuit open; no fallback available".to_string()),
        };

        LabelResponse {
            value,
            success: false,
            path: "cache".to_string(),
            latency: started.elapsed(),
            error: Some(FailureKind::CircuitOpen),
            reason: Some(reason),
            compensated: None,
            trace_id,
        }
    }
}

/// Map a pipeline failure to its envelope classification.
fn classify(error: &PipelineError) -> (FailureKind, String) {
    match error {
        PipelineError::Deadline(err) => (FailureKind::Timeout, err.to_string()),
        PipelineError::Retry(RetryError::Exhausted { attempts, last }) => match last {
            AttemptError::NoTarget => (
                FailureKind::NotFound,
                format!("no target resolved after {attempts} attempts"),
            ),
            AttemptError::Normalize(message) => (
                FailureKind::Unknown,
                format!("normalization failed after {attempts} attempts: {message}"),
            ),
        },
    }
}

/// Element id of the payload's resolved target, used to key the fallback cache.
fn element_id(payload: &Value) -> Option<String> {
    resolve::resolve(payload)
        .candidate?
        .get("id")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_deadline() {
        let error = PipelineError::Deadline(DeadlineExceeded {
            limit: Duration::from_millis(5),
        });

        let (kind, reason) = classify(&error);
        assert_eq!(kind, FailureKind::Timeout);
        assert!(reason.contains("5ms"));
    }

    #[test]
    fn test_classify_no_target_exhaustion() {
        let error = PipelineError::Retry(RetryError::Exhausted {
            attempts: 3,
            last: AttemptError::NoTarget,
        });

        let (kind, reason) = classify(&error);
        assert_eq!(kind, FailureKind::NotFound);
        assert!(reason.contains("3 attempts"));
    }

    #[test]
    fn test_classify_normalize_exhaustion() {
        let error = PipelineError::Retry(RetryError::Exhausted {
            attempts: 3,
            last: AttemptError::Normalize("upstream 503".to_string()),
        });

        let (kind, reason) = classify(&error);
        assert_eq!(kind, FailureKind::Unknown);
        assert!(reason.contains("upstream 503"));
    }

    #[test]
    fn test_element_id_probes_slots() {
        let payload = serde_json::json!({"srcElement": {"id": "save-btn"}});
        assert_eq!(element_id(&payload).as_deref(), Some("save-btn"));

        let anonymous = serde_json::json!({"srcElement": {}});
        assert!(element_id(&anonymous).is_none());

        let no_target = serde_json::json!({"type": "click"});
        assert!(element_id(&no_target).is_none());
    }
}
