//! Result envelope and failure taxonomy

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Machine-readable failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed request, surfaced before the pipeline runs
    Validation,

    /// The deadline elapsed before the pipeline settled
    Timeout,

    /// No target or value could be resolved within the retry budget
    NotFound,

    /// The gate denied the attempt; the wrapped operation never ran
    CircuitOpen,

    /// Anything else, including failed normalization
    Unknown,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Timeout => write!(f, "timeout"),
            Self::NotFound => write!(f, "not_found"),
            Self::CircuitOpen => write!(f, "circuit_open"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Uniform response envelope
///
/// Terminal and fully populated: `success = false` always pairs with an
/// empty value or a cached fallback value plus a populated `error`.
/// `latency` and `trace_id` are per-call; every other field is stable for a
/// given request key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelResponse {
    /// The resolved value, possibly empty
    pub value: String,

    /// Whether the pipeline produced a value normally
    pub success: bool,

    /// Slot that produced the value, or `"cache"` on the degraded path
    pub path: String,

    /// Wall-clock time spent serving this call
    #[serde(with = "duration_millis")]
    pub latency: Duration,

    /// Failure classification, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,

    /// Human-readable failure description, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Whether compensation ran and succeeded; set only when a compensation
    /// hook ran for this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensated: Option<bool>,

    /// Per-call trace identifier
    pub trace_id: Uuid,
}

impl LabelResponse {
    /// Build a success envelope
    pub fn success(value: String, path: String, latency: Duration, trace_id: Uuid) -> Self {
        Self {
            value,
            success: true,
            path,
            latency,
            error: None,
            reason: None,
            compensated: None,
            trace_id,
        }
    }

    /// Build a failure envelope with an empty value
    pub fn failure(
        kind: FailureKind,
        reason: String,
        path: String,
        latency: Duration,
        trace_id: Uuid,
    ) -> Self {
        Self {
            value: String::new(),
            success: false,
            path,
            latency,
            error: Some(kind),
            reason: Some(reason),
            compensated: None,
            trace_id,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Validation.to_string(), "validation");
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
        assert_eq!(FailureKind::NotFound.to_string(), "not_found");
        assert_eq!(FailureKind::CircuitOpen.to_string(), "circuit_open");
        assert_eq!(FailureKind::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_success_envelope_shape() {
        let envelope = LabelResponse::success(
            "confirm".to_string(),
            "target".to_string(),
            Duration::from_millis(2),
            Uuid::now_v7(),
        );

        assert!(envelope.success);
        assert!(envelope.error.is_none());
        assert!(envelope.reason.is_none());
    }

    #[test]
    fn test_failure_envelope_pairs_empty_value_with_kind() {
        let envelope = LabelResponse::failure(
            FailureKind::Timeout,
            "deadline of 5ms exceeded".to_string(),
            "none".to_string(),
            Duration::from_millis(5),
            Uuid::now_v7(),
        );

        assert!(!envelope.success);
        assert_eq!(envelope.value, "");
        assert_eq!(envelope.error, Some(FailureKind::Timeout));
        assert!(envelope.reason.is_some());
    }

    #[test]
    fn test_serialization_round_trip() {
        let envelope = LabelResponse::success(
            "save".to_string(),
            "srcElement".to_string(),
            Duration::from_millis(3),
            Uuid::now_v7(),
        );

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"srcElement\""));
        // Success envelopes omit the failure fields entirely
        assert!(!json.contains("\"error\""));

        let parsed: LabelResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }
}
