//! Service configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reliability::{CircuitBreakerConfig, RetryPolicy};

/// Pipeline configuration
///
/// # Example
///
/// ```
/// use relabel_core::service::ServiceConfig;
/// use std::time::Duration;
///
/// let config = ServiceConfig::default()
///     .with_deadline(Duration::from_millis(100))
///     .with_default_attribute("data-step");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Attribute read when the request does not name one
    pub default_attribute: String,

    /// Overall per-request deadline
    #[serde(with = "duration_millis")]
    pub deadline: Duration,

    /// Retry policy for pipeline attempts
    pub retry: RetryPolicy,

    /// Gate configuration
    pub circuit_breaker: CircuitBreakerConfig,

    /// How long a fallback value stays servable on the degraded path
    #[serde(with = "duration_millis")]
    pub fallback_ttl: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_attribute: "data-action".to_string(),
            deadline: Duration::from_millis(5),
            retry: RetryPolicy::exponential(),
            circuit_breaker: CircuitBreakerConfig::default(),
            fallback_ttl: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attribute read when the request does not name one
    pub fn with_default_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.default_attribute = attribute.into();
        self
    }

    /// Set the overall per-request deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the gate configuration
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the fallback value lifetime
    pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl = ttl;
        self
    }
}

/// Serde support for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
