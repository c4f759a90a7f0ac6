//! In-memory idempotency cache backed by DashMap
//!
//! A process-local [`IdempotencyCache`] implementation for tests, dry runs,
//! and single-process deployments. Production deployments substitute a
//! shared cache service behind the same trait.
//!
//! # Atomicity
//!
//! `set_if_absent` uses DashMap's entry API, which holds the shard lock for
//! the duration of the check-and-insert. Two concurrent calls with the same
//! absent key therefore serialize, and exactly one observes `true`.
//!
//! # Expiry
//!
//! Entries carry an absolute deadline taken from the tokio clock, so TTL
//! behavior is testable under `tokio::time::pause`. Expired entries are
//! treated as absent and lazily replaced on the next write to their key.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::core::traits::IdempotencyCache;
use crate::types::CacheError;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe in-memory key-value store with per-entry expiry
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired())
            .count()
    }

    /// Whether the cache holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdempotencyCache for InMemoryCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.value().is_expired()))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        // The entry call holds the shard lock across the check-and-insert,
        // which is what makes this primitive atomic.
        let mut claimed = false;
        self.entries
            .entry(key.to_string())
            .and_modify(|existing| {
                if existing.is_expired() {
                    *existing = CacheEntry::new(value, ttl);
                    claimed = true;
                }
            })
            .or_insert_with(|| {
                claimed = true;
                CacheEntry::new(value, ttl)
            });
        Ok(claimed)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).and_then(|entry| {
            if entry.value().is_expired() {
                None
            } else {
                Some(entry.value().value.clone())
            }
        }))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_set_if_absent_claims_only_once() {
        let cache = InMemoryCache::new();

        assert!(cache.set_if_absent("k", "a", TTL).await.unwrap());
        assert!(!cache.set_if_absent("k", "b", TTL).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_exists_and_get() {
        let cache = InMemoryCache::new();

        assert!(!cache.exists("k").await.unwrap());
        cache.set("k", "v", TTL).await.unwrap();
        assert!(cache.exists("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(cache.get("other").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", TTL).await.unwrap();

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert!(!cache.exists("k").await.unwrap());
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
        // An expired key can be claimed again
        assert!(cache.set_if_absent("k", "w", TTL).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let cache = InMemoryCache::new();
        cache.set("k", "old", TTL).await.unwrap();
        cache.set("k", "new", TTL).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_set_if_absent_single_winner() {
        use std::sync::Arc;

        let cache = Arc::new(InMemoryCache::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .set_if_absent("contended", &format!("writer-{}", i), TTL)
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
