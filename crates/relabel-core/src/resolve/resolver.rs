//! Event target resolution
//!
//! Event-like records expose their subject element under different slot names
//! depending on where they originated. Resolution probes the slots in a fixed
//! priority order and reports which one matched, so callers can surface the
//! resolution path in responses and metrics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Slots of an event record that can hold the subject element
///
/// Serialized as the literal slot names (`"srcElement"` and friends) so the
/// resolution path survives round trips unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSlot {
    /// `target`, the standard slot
    #[serde(rename = "target")]
    Target,

    /// `srcElement`, populated by legacy engines
    #[serde(rename = "srcElement")]
    SrcElement,

    /// `currentTarget`, populated for delegated handlers
    #[serde(rename = "currentTarget")]
    CurrentTarget,

    /// `relatedTarget`, populated for focus-style events
    #[serde(rename = "relatedTarget")]
    RelatedTarget,

    /// No slot held a structural candidate
    #[serde(rename = "none")]
    None,
}

impl TargetSlot {
    /// Name of the payload field this slot reads
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::SrcElement => "srcElement",
            Self::CurrentTarget => "currentTarget",
            Self::RelatedTarget => "relatedTarget",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for TargetSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Probe order. The standard slot wins over legacy and delegated slots.
const SLOT_ORDER: [TargetSlot; 4] = [
    TargetSlot::Target,
    TargetSlot::SrcElement,
    TargetSlot::CurrentTarget,
    TargetSlot::RelatedTarget,
];

/// A resolved target: the candidate object and the slot it came from
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget<'a> {
    /// The matched candidate, when any slot held one
    pub candidate: Option<&'a Value>,

    /// Slot that produced the candidate
    pub slot: TargetSlot,
}

/// Resolve the subject element of an event-like record.
///
/// Only structural objects count as candidates; a slot holding a string,
/// number or other primitive is skipped. Returns `slot = None` when nothing
/// matches. Total over all inputs, never fails.
pub fn resolve(payload: &Value) -> ResolvedTarget<'_> {
    for slot in SLOT_ORDER {
        if let Some(candidate) = payload.get(slot.field_name()) {
            if candidate.is_object() {
                return ResolvedTarget {
                    candidate: Some(candidate),
                    slot,
                };
            }
        }
    }

    ResolvedTarget {
        candidate: None,
        slot: TargetSlot::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_slot_wins() {
        let payload = json!({
            "target": {"id": "save"},
            "srcElement": {"id": "legacy"},
        });

        let resolved = resolve(&payload);
        assert_eq!(resolved.slot, TargetSlot::Target);
        assert_eq!(resolved.candidate.unwrap()["id"], "save");
    }

    #[test]
    fn test_legacy_only_payload_selects_src_element() {
        let payload = json!({"srcElement": {"id": "legacy"}});

        let resolved = resolve(&payload);
        assert_eq!(resolved.slot, TargetSlot::SrcElement);
        assert!(resolved.candidate.is_some());
    }

    #[test]
    fn test_delegated_and_related_slots() {
        let delegated = json!({"currentTarget": {"id": "list"}});
        assert_eq!(resolve(&delegated).slot, TargetSlot::CurrentTarget);

        let related = json!({"relatedTarget": {"id": "blur"}});
        assert_eq!(resolve(&related).slot, TargetSlot::RelatedTarget);
    }

    #[test]
    fn test_primitive_slot_values_are_skipped() {
        let payload = json!({
            "target": "not-an-object",
            "srcElement": 42,
            "currentTarget": {"id": "real"},
        });

        let resolved = resolve(&payload);
        assert_eq!(resolved.slot, TargetSlot::CurrentTarget);
    }

    #[test]
    fn test_no_candidate() {
        let payload = json!({"type": "click"});
        let resolved = resolve(&payload);
        assert_eq!(resolved.slot, TargetSlot::None);
        assert!(resolved.candidate.is_none());
    }

    #[test]
    fn test_slot_display_names() {
        assert_eq!(TargetSlot::Target.to_string(), "target");
        assert_eq!(TargetSlot::SrcElement.to_string(), "srcElement");
        assert_eq!(TargetSlot::CurrentTarget.to_string(), "currentTarget");
        assert_eq!(TargetSlot::RelatedTarget.to_string(), "relatedTarget");
        assert_eq!(TargetSlot::None.to_string(), "none");
    }

    #[test]
    fn test_slot_serialization() {
        let json = serde_json::to_string(&TargetSlot::SrcElement).unwrap();
        assert_eq!(json, "\"srcElement\"");
        let parsed: TargetSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TargetSlot::SrcElement);
    }
}
