//! Last-good value cache for degraded responses

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Time-boxed cache of the most recent successful value per element id
///
/// Refreshed after every successful resolution and consulted only when the
/// gate denies an attempt, so a recently seen element can still be served a
/// best-effort value while the dependency recovers.
#[derive(Debug)]
pub struct FallbackCache {
    entries: DashMap<String, (String, DateTime<Utc>)>,
    ttl: Duration,
}

impl FallbackCache {
    /// Create a cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Store the most recent value for an element
    pub fn put(&self, element_id: &str, value: &str) {
        self.entries
            .insert(element_id.to_string(), (value.to_string(), Utc::now()));
    }

    /// Fetch the cached value for an element, absent when missing or expired
    pub fn get(&self, element_id: &str) -> Option<String> {
        let expired = match self.entries.get(element_id) {
            None => return None,
            Some(entry) => {
                let (value, stored_at) = entry.value();
                let age = Utc::now()
                    .signed_duration_since(*stored_at)
                    .to_std()
                    .unwrap_or(Duration::MAX);
                if age <= self.ttl {
                    return Some(value.clone());
                }
                true
            }
        };

        if expired {
            self.entries.remove(element_id);
        }
        None
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = FallbackCache::new(Duration::from_secs(60));
        cache.put("save-btn", "confirm");

        assert_eq!(cache.get("save-btn").as_deref(), Some("confirm"));
        assert!(cache.get("other").is_none());
    }

    #[test]
    fn test_latest_value_wins() {
        let cache = FallbackCache::new(Duration::from_secs(60));
        cache.put("save-btn", "first");
        cache.put("save-btn", "second");

        assert_eq!(cache.get("save-btn").as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_evicted() {
        let cache = FallbackCache::new(Duration::ZERO);
        cache.put("save-btn", "confirm");

        std::thread::sleep(Duration::from_millis(5));

        assert!(cache.get("save-btn").is_none());
        assert!(cache.is_empty());
    }
}
