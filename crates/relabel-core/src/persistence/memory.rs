//! In-memory implementation of IdempotencyStore

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::store::{IdempotencyEntry, IdempotencyStore, StoreError};
use crate::service::LabelResponse;

/// In-memory idempotency store
///
/// The only implementation shipped with this crate; a database-backed store
/// can slot in behind the same trait. Entries older than the optional TTL
/// read as absent and are evicted on access.
///
/// # Example
///
/// ```
/// use relabel_core::persistence::InMemoryIdempotencyStore;
/// use std::time::Duration;
///
/// let store = InMemoryIdempotencyStore::new().with_ttl(Duration::from_secs(300));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryIdempotencyStore {
    entries: DashMap<String, IdempotencyEntry>,
    ttl: Option<Duration>,
}

impl InMemoryIdempotencyStore {
    /// Create a store without expiry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
        }
    }

    /// Set an entry lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries (for testing)
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn get(&self, key: &str) -> Result<Option<IdempotencyEntry>, StoreError> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => match self.ttl {
                None => return Ok(Some(entry.clone())),
                Some(ttl) => {
                    let age = Utc::now()
                        .signed_duration_since(entry.stored_at)
                        .to_std()
                        .unwrap_or(Duration::MAX);
                    if age <= ttl {
                        return Ok(Some(entry.clone()));
                    }
                    true
                }
            },
        };

        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, envelope: LabelResponse) -> Result<(), StoreError> {
        self.entries.insert(
            key.to_string(),
            IdempotencyEntry {
                key: key.to_string(),
                envelope,
                stored_at: Utc::now(),
            },
        );
        Ok(())
    }
}
