//! Retry policy and executor
//!
//! Repeats a fallible asynchronous action with exponential backoff,
//! short-circuiting once a usable value is produced.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Configuration for retries
///
/// Supports exponential backoff with optional jitter.
///
/// # Example
///
/// ```
/// use relabel_core::reliability::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential()
///     .with_max_attempts(5)
///     .with_base_delay(Duration::from_millis(25));
///
/// // First retry after ~25ms
/// // Second retry after ~50ms
/// // Third retry after ~100ms
/// // etc.
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one)
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    #[serde(with = "duration_millis")]
    pub base_delay: Duration,

    /// Delay ceiling
    #[serde(with = "duration_millis")]
    pub max_delay: Duration,

    /// Backoff multiplier applied per failed attempt
    pub multiplier: f64,

    /// Jitter factor (0.0-1.0) to add randomness
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential()
    }
}

impl RetryPolicy {
    /// Exponential backoff with the pipeline defaults
    ///
    /// - 3 max attempts
    /// - 10 millisecond base delay
    /// - 2x multiplier, no jitter
    pub fn exponential() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Set the maximum number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the delay after the first failed attempt
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the delay ceiling
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the jitter factor (0.0-1.0)
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay to sleep after failed attempt `attempt` (0-indexed)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let jittered = if self.jitter > 0.0 {
            let range = capped * self.jitter;
            let offset = rand::thread_rng().gen_range(-range..range);
            (capped + offset).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }
}

/// Retry exhaustion, carrying the last underlying error
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Drives an action through a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create an executor for the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Get the policy driving this executor
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `action` until it produces a usable value or attempts run out.
    ///
    /// `action` receives the 0-indexed attempt number. A failed attempt `i`
    /// is followed by a sleep of `base_delay * multiplier^i`; the final
    /// attempt fails immediately with no sleep. An outcome for which
    /// `is_empty` returns true counts as a failure on all but the final
    /// attempt; on the final attempt it is returned as-is, so total attempts
    /// are bounded strictly by `max_attempts`.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut action: F,
        is_empty: impl Fn(&T) -> bool,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let final_attempt = attempt + 1 >= max_attempts;

            match action(attempt).await {
                Ok(value) => {
                    if !is_empty(&value) || final_attempt {
                        return Ok(value);
                    }
                    debug!(attempt, "no value produced, retrying");
                }
                Err(last) if final_attempt => {
                    return Err(RetryError::Exhausted {
                        attempts: max_attempts,
                        last,
                    });
                }
                Err(error) => {
                    debug!(attempt, error = %error, "attempt failed, retrying");
                }
            }

            let delay = self.policy.delay_after(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
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
