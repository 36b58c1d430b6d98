//! Circuit breaker
//!
//! Protects the resolution pipeline's downstream dependency from cascading
//! failures. When the rolling success rate drops below a threshold the
//! circuit "opens" and requests fail fast to a degraded path without calling
//! the dependency.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, attempts admitted
    Closed,

    /// Failure threshold exceeded, attempts denied
    Open,

    /// Testing recovery, a single trial attempt admitted
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Circuit breaker configuration
///
/// # State Machine
///
/// ```text
/// ┌─────────┐  rate below threshold  ┌─────────┐  cooldown elapsed  ┌──────────┐
/// │ Closed  │ ─────────────────────► │  Open   │ ─────────────────► │ HalfOpen │
/// └─────────┘   (sample floor met)   └─────────┘  (on gate check)   └──────────┘
///      ▲                                  ▲                               │
///      │         trial succeeds           │        trial fails            │
///      └──────────────────────────────────┴───────────────────────────────┘
/// ```
///
/// The Open to HalfOpen edge is evaluated lazily on the next gate check,
/// never by a background timer.
///
/// # Example
///
/// ```
/// use relabel_core::reliability::CircuitBreakerConfig;
/// use std::time::Duration;
///
/// let config = CircuitBreakerConfig::default()
///     .with_success_rate_threshold(0.95)
///     .with_cooldown(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Success-rate floor; the circuit opens when the rolling rate drops below it
    pub success_rate_threshold: f64,

    /// Attempts required before the rate is evaluated at all
    pub minimum_sample_size: u32,

    /// Time to stay open before admitting a half-open trial
    #[serde(with = "duration_millis")]
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            success_rate_threshold: 0.9,
            minimum_sample_size: 20,
            cooldown: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new circuit breaker configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success-rate floor below which the circuit opens
    pub fn with_success_rate_threshold(mut self, threshold: f64) -> Self {
        self.success_rate_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the number of attempts required before the rate is evaluated
    pub fn with_minimum_sample_size(mut self, samples: u32) -> Self {
        self.minimum_sample_size = samples;
        self
    }

    /// Set the cooldown before a half-open trial is admitted
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Point-in-time view of breaker state, for status surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub success_count: u32,
    pub failure_count: u32,
    pub success_rate: f64,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    success_count: u32,
    failure_count: u32,
    last_transition: Instant,
    trial_in_flight: bool,
}

impl BreakerInner {
    fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }

    fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 1.0;
        }
        f64::from(self.success_count) / f64::from(self.total())
    }
}

/// Three-state gate over a failing dependency
///
/// All mutation happens behind a single lock so concurrent attempts observe
/// each other's outcomes. [`CircuitBreaker::can_attempt`] is the sole read
/// entry point, [`CircuitBreaker::record_success`] and
/// [`CircuitBreaker::record_failure`] the sole write entry points; each
/// completed attempt records exactly once, after its outcome is known.
///
/// In `HalfOpen` a single trial is admitted until it resolves; concurrent
/// gate checks during the trial window are denied.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a new breaker in the closed state
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                success_count: 0,
                failure_count: 0,
                last_transition: Instant::now(),
                trial_in_flight: false,
            }),
        }
    }

    /// Get the breaker configuration
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Check whether an attempt may proceed.
    ///
    /// In `Open`, the cooldown is evaluated here: once it has elapsed the
    /// breaker moves to `HalfOpen` and admits the calling request as the
    /// trial. The caller must report the attempt's outcome through
    /// [`record_success`](Self::record_success) or
    /// [`record_failure`](Self::record_failure).
    pub fn can_attempt(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if inner.last_transition.elapsed() >= self.config.cooldown {
                    inner.state = CircuitState::HalfOpen;
                    inner.last_transition = Instant::now();
                    inner.trial_in_flight = true;
                    info!(state = %CircuitState::HalfOpen, "circuit cooldown elapsed, admitting trial");
                    true
                } else {
                    debug!("circuit open, attempt denied");
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    debug!("half-open trial in flight, attempt denied");
                    false
                } else {
                    inner.trial_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful attempt
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.success_count += 1;

        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Closed;
            inner.success_count = 0;
            inner.failure_count = 0;
            inner.last_transition = Instant::now();
            inner.trial_in_flight = false;
            info!(state = %CircuitState::Closed, "trial succeeded, circuit closed");
        }
    }

    /// Record a failed attempt
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.failure_count += 1;

        match inner.state {
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.last_transition = Instant::now();
                inner.trial_in_flight = false;
                warn!(state = %CircuitState::Open, "trial failed, circuit reopened");
            }
            CircuitState::Closed => {
                let rate = inner.success_rate();
                if inner.total() >= self.config.minimum_sample_size
                    && rate < self.config.success_rate_threshold
                {
                    inner.state = CircuitState::Open;
                    inner.last_transition = Instant::now();
                    warn!(
                        state = %CircuitState::Open,
                        success_rate = rate,
                        failures = inner.failure_count,
                        "failure rate over threshold, circuit opened"
                    );
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Current state without side effects
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Snapshot of counters for status surfaces
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            state: inner.state,
            success_count: inner.success_count,
            failure_count: inner.failure_count,
            success_rate: inner.success_rate(),
        }
    }

    /// Reset to the closed state (for tests and admin operations)
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.success_count = 0;
        inner.failure_count = 0;
        inner.last_transition = Instant::now();
        inner.trial_in_flight = false;
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
