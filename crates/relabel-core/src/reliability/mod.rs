//! Reliability patterns for the resolution pipeline
//!
//! This module provides:
//! - [`CircuitBreaker`] - Three-state gate over a failing dependency
//! - [`RetryPolicy`] / [`RetryExecutor`] - Configurable retry with exponential backoff
//! - [`with_deadline`] - Deadline racing for slow operations
//! - [`run_saga`] - Do/compensate execution

mod circuit_breaker;
mod retry;
mod saga;
mod timeout;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::{RetryError, RetryExecutor, RetryPolicy};
pub use saga::{run_saga, SagaOutcome};
pub use timeout::{with_deadline, DeadlineExceeded};
