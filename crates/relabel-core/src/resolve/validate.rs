//! Request validation

use serde_json::Value;
use thiserror::Error;

/// Malformed-request error
///
/// The only error the pipeline surfaces to callers as `Err`; every other
/// failure mode is a valued response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The payload is not a structural record
    #[error("payload must be an event-like object")]
    PayloadNotObject,

    /// The attribute name is empty or whitespace
    #[error("attribute name must not be empty")]
    EmptyAttribute,

    /// The attribute name contains unsupported characters
    #[error("attribute name must start alphabetic and contain only alphanumerics, dash or underscore: {0:?}")]
    MalformedAttribute(String),
}

/// Validate an incoming payload and attribute pair.
pub fn validate_request(payload: &Value, attribute: &str) -> Result<(), ValidationError> {
    if !payload.is_object() {
        return Err(ValidationError::PayloadNotObject);
    }

    if attribute.trim().is_empty() {
        return Err(ValidationError::EmptyAttribute);
    }

    let mut chars = attribute.chars();
    let head_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !head_ok || !tail_ok {
        return Err(ValidationError::MalformedAttribute(attribute.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_object_payload_and_plain_attribute() {
        assert!(validate_request(&json!({"target": {}}), "data-action").is_ok());
        assert!(validate_request(&json!({}), "role").is_ok());
    }

    #[test]
    fn test_rejects_non_object_payload() {
        assert_eq!(
            validate_request(&json!("click"), "data-action"),
            Err(ValidationError::PayloadNotObject)
        );
        assert_eq!(
            validate_request(&json!(null), "data-action"),
            Err(ValidationError::PayloadNotObject)
        );
    }

    #[test]
    fn test_rejects_empty_attribute() {
        assert_eq!(
            validate_request(&json!({}), ""),
            Err(ValidationError::EmptyAttribute)
        );
        assert_eq!(
            validate_request(&json!({}), "   "),
            Err(ValidationError::EmptyAttribute)
        );
    }

    #[test]
    fn test_rejects_malformed_attribute() {
        assert!(matches!(
            validate_request(&json!({}), "1data"),
            Err(ValidationError::MalformedAttribute(_))
        ));
        assert!(matches!(
            validate_request(&json!({}), "data action"),
            Err(ValidationError::MalformedAttribute(_))
        ));
    }
}
