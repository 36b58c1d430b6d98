//! The resolution pipeline
//!
//! This module provides:
//! - [`LabelService`] - Composes memoization, circuit breaking, deadline,
//!   retry and the resolve/read chain into a single request pipeline
//! - [`LabelRequest`] / [`LabelResponse`] - The request and envelope types
//! - [`LabelNormalizer`] / [`CompensationHook`] - Caller-supplied collaborators

mod config;
mod envelope;
mod fallback;
mod hooks;
mod orchestrator;
mod request;

pub use config::ServiceConfig;
pub use envelope::{FailureKind, LabelResponse};
pub use fallback::FallbackCache;
pub use hooks::{CompensationHook, LabelNormalizer};
pub use orchestrator::LabelService;
pub use request::{LabelRequest, RequestOptions};
