//! Caller-supplied collaborators

use std::time::Duration;

use async_trait::async_trait;

/// External label normalization
///
/// The pipeline races this call under its own deadline; `timeout_hint` is
/// forwarded as a courtesy and the callee is not assumed to honor it. A call
/// abandoned by the deadline may still complete downstream; its result is
/// discarded.
#[async_trait]
pub trait LabelNormalizer: Send + Sync {
    /// Normalize an extracted value
    async fn normalize(&self, value: &str, timeout_hint: Duration) -> anyhow::Result<String>;
}

/// Compensating action run when a request fails irrecoverably
///
/// Invoked through the saga runner: at most once per failed request, never
/// retried. Implementations undo partial effects the request may have
/// issued, keyed by the request's idempotency key.
#[async_trait]
pub trait CompensationHook: Send + Sync {
    /// Undo partial effects for the given request key
    async fn compensate(&self, key: &str) -> anyhow::Result<()>;
}
