//! Pluggable storage contracts
//!
//! This module provides:
//! - [`IdempotencyStore`] - Key to stored-response mapping with short-circuit semantics
//! - [`InMemoryIdempotencyStore`] - Concurrent in-memory implementation
//! - [`OutboxSink`] / [`InMemoryOutbox`] - Append-only record of notable outcomes

mod memory;
mod outbox;
mod store;

pub use memory::InMemoryIdempotencyStore;
pub use outbox::{InMemoryOutbox, OutboxRecord, OutboxSink};
pub use store::{IdempotencyEntry, IdempotencyStore, StoreError};
