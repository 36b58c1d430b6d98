//! Attribute reading strategies
//!
//! A resolved target may expose a label under a W3C-style attribute map, an
//! HTML5-style dataset, or a plain property. The reader tries each strategy
//! in a fixed order and records the one that matched. Values that are not
//! well formed (over-long or containing non-semantic characters) are treated
//! as no-match so a later strategy can still win.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest value accepted from any strategy
const MAX_VALUE_LEN: usize = 256;

/// Strategy that produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// `attributes` map lookup
    Attribute,

    /// `dataset` lookup with camelCase key conversion
    Dataset,

    /// Direct property access on the target
    Property,

    /// Nothing matched
    None,
}

impl std::fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attribute => write!(f, "attribute"),
            Self::Dataset => write!(f, "dataset"),
            Self::Property => write!(f, "property"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of one read over one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// The extracted value, empty when nothing matched
    pub value: String,

    /// Strategy that produced the value
    pub strategy: ReadStrategy,

    /// Whether any strategy matched
    pub matched: bool,
}

impl Extraction {
    /// An empty, unmatched outcome
    pub fn none() -> Self {
        Self {
            value: String::new(),
            strategy: ReadStrategy::None,
            matched: false,
        }
    }

    fn hit(value: &str, strategy: ReadStrategy) -> Self {
        Self {
            value: value.to_string(),
            strategy,
            matched: true,
        }
    }
}

/// Read `attribute` from a target object.
///
/// Strategies run in order: attribute map, dataset (for `data-*` names),
/// direct property. The first well-formed string value wins.
pub fn read(target: &Value, attribute: &str) -> Extraction {
    if let Some(value) = target
        .get("attributes")
        .and_then(|attrs| attrs.get(attribute))
        .and_then(Value::as_str)
    {
        if well_formed(value) {
            return Extraction::hit(value, ReadStrategy::Attribute);
        }
    }

    if attribute.starts_with("data-") {
        let key = to_dataset_key(attribute);
        if let Some(value) = target
            .get("dataset")
            .and_then(|dataset| dataset.get(&key))
            .and_then(Value::as_str)
        {
            if well_formed(value) {
                return Extraction::hit(value, ReadStrategy::Dataset);
            }
        }
    }

    if let Some(value) = target.get(attribute).and_then(Value::as_str) {
        if well_formed(value) {
            return Extraction::hit(value, ReadStrategy::Property);
        }
    }

    Extraction::none()
}

/// Convert a `data-*` attribute name to its camelCase dataset key.
///
/// `data-action` becomes `action`, `data-my-action` becomes `myAction`.
/// Names without the `data-` prefix pass through unchanged.
pub fn to_dataset_key(attribute: &str) -> String {
    let Some(rest) = attribute.strip_prefix("data-") else {
        return attribute.to_string();
    };

    let mut key = String::with_capacity(rest.len());
    for (index, chunk) in rest.split('-').enumerate() {
        if index == 0 {
            key.push_str(chunk);
        } else if let Some(first) = chunk.chars().next() {
            key.extend(first.to_uppercase());
            key.push_str(&chunk[first.len_utf8()..]);
        }
    }
    key
}

/// Labels are short semantic identifiers: alphanumerics, dash, underscore.
fn well_formed(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_VALUE_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_map_read() {
        let target = json!({"attributes": {"data-action": "confirm"}});
        let extraction = read(&target, "data-action");

        assert!(extraction.matched);
        assert_eq!(extraction.value, "confirm");
        assert_eq!(extraction.strategy, ReadStrategy::Attribute);
    }

    #[test]
    fn test_dataset_read_with_key_conversion() {
        let target = json!({"dataset": {"myAction": "save"}});
        let extraction = read(&target, "data-my-action");

        assert!(extraction.matched);
        assert_eq!(extraction.value, "save");
        assert_eq!(extraction.strategy, ReadStrategy::Dataset);
    }

    #[test]
    fn test_property_read() {
        let target = json!({"data-action": "delete"});
        let extraction = read(&target, "data-action");

        assert!(extraction.matched);
        assert_eq!(extraction.value, "delete");
        assert_eq!(extraction.strategy, ReadStrategy::Property);
    }

    #[test]
    fn test_attribute_map_wins_over_dataset_and_property() {
        let target = json!({
            "attributes": {"data-action": "from-attributes"},
            "dataset": {"action": "from-dataset"},
            "data-action": "from-property",
        });

        let extraction = read(&target, "data-action");
        assert_eq!(extraction.value, "from-attributes");
        assert_eq!(extraction.strategy, ReadStrategy::Attribute);
    }

    #[test]
    fn test_empty_string_is_no_match() {
        let target = json!({"attributes": {"data-action": ""}});
        let extraction = read(&target, "data-action");

        assert!(!extraction.matched);
        assert_eq!(extraction.strategy, ReadStrategy::None);
    }

    #[test]
    fn test_malformed_value_falls_through() {
        // The attribute map holds junk, the dataset holds a usable value
        let target = json!({
            "attributes": {"data-action": "has spaces!"},
            "dataset": {"action": "ok"},
        });

        let extraction = read(&target, "data-action");
        assert_eq!(extraction.value, "ok");
        assert_eq!(extraction.strategy, ReadStrategy::Dataset);
    }

    #[test]
    fn test_over_long_value_rejected() {
        let target = json!({"attributes": {"data-action": "x".repeat(257)}});
        assert!(!read(&target, "data-action").matched);
    }

    #[test]
    fn test_non_string_values_skipped() {
        let target = json!({
            "attributes": {"data-action": 7},
            "dataset": {"action": true},
        });
        assert!(!read(&target, "data-action").matched);
    }

    #[test]
    fn test_dataset_key_conversion() {
        assert_eq!(to_dataset_key("data-action"), "action");
        assert_eq!(to_dataset_key("data-my-action"), "myAction");
        assert_eq!(to_dataset_key("data-my-long-action"), "myLongAction");
        assert_eq!(to_dataset_key("aria-label"), "aria-label");
    }

    #[test]
    fn test_strategy_display_names() {
        assert_eq!(ReadStrategy::Attribute.to_string(), "attribute");
        assert_eq!(ReadStrategy::Dataset.to_string(), "dataset");
        assert_eq!(ReadStrategy::Property.to_string(), "property");
        assert_eq!(ReadStrategy::None.to_string(), "none");
    }
}
