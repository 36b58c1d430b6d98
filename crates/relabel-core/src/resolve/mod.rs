//! Target resolution and attribute reading
//!
//! This module provides:
//! - [`resolve`] - Slot-priority target resolution over event-like records
//! - [`read`] - Ordered read-strategy chain over a resolved target
//! - [`validate_request`] - Input validation for payload and attribute name

mod reader;
mod resolver;
mod validate;

pub use reader::{read, to_dataset_key, Extraction, ReadStrategy};
pub use resolver::{resolve, ResolvedTarget, TargetSlot};
pub use validate::{validate_request, ValidationError};
