//! IdempotencyStore trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::LabelResponse;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Stored data could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// A stored response for an idempotency key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// The request key this entry belongs to
    pub key: String,

    /// The response served for the first completed request with this key
    pub envelope: LabelResponse,

    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

/// Key to response mapping used to skip redundant work for repeated keys
///
/// A present, unexpired key must short-circuit the whole pipeline; the
/// stored envelope is returned without re-executing any side effects, so a
/// key sees at most one side-effect execution. Entries are written only
/// after a request completes, so concurrent requests racing on the same key
/// before the first write may each run the operation; the wrapped
/// operation's own idempotence is relied on for that window.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Look up the entry for `key`, absent when missing or expired
    async fn get(&self, key: &str) -> Result<Option<IdempotencyEntry>, StoreError>;

    /// Store the response served for `key`
    async fn set(&self, key: &str, envelope: LabelResponse) -> Result<(), StoreError>;
}
