//! Cache service interface and an in-process implementation.

use super::{ServiceError, ServiceResult, StatefulService};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Default time-to-live for cached values.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[async_trait]
pub trait CacheService: Send + Sync {
    async fn get(&self, key: &str) -> ServiceResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> ServiceResult<()>;

    async fn delete(&self, key: &str) -> ServiceResult<()>;
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local cache with per-entry expiry.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`purge_expired`](InMemoryCache::purge_expired).
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ready: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_ready(&self) -> ServiceResult<()> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ServiceError::NotInitialized {
                service: self.name().to_string(),
            })
        }
    }

    /// Remove expired entries; returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get(&self, key: &str) -> ServiceResult<Option<Value>> {
        self.ensure_ready()?;
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> ServiceResult<()> {
        self.ensure_ready()?;
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> ServiceResult<()> {
        self.ensure_ready()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl StatefulService for InMemoryCache {
    fn name(&self) -> &str {
        "cache"
    }

    async fn initialize(&self) -> ServiceResult<()> {
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn cleanup(&self) -> ServiceResult<()> {
        self.ready.store(false, Ordering::Release);
        let mut entries = self.entries.write().await;
        debug!(count = entries.len(), "Dropping cached entries");
        entries.clear();
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn ready_cache() -> InMemoryCache {
        let cache = InMemoryCache::new();
        cache.initialize().await.unwrap();
        cache
    }

    #[tokio::test]
    async fn test_requires_initialize() {
        let cache = InMemoryCache::new();
        assert!(matches!(
            cache.get("k").await,
            Err(ServiceError::NotInitialized { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = ready_cache().await;
        cache
            .set("user:1", json!({"name": "Ada"}), DEFAULT_CACHE_TTL)
            .await
            .unwrap();
        assert_eq!(
            cache.get("user:1").await.unwrap(),
            Some(json!({"name": "Ada"}))
        );

        cache.delete("user:1").await.unwrap();
        assert_eq!(cache.get("user:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_returned() {
        let cache = ready_cache().await;
        cache.set("short", json!(1), Duration::ZERO).await.unwrap();
        cache
            .set("long", json!(2), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.len().await, 1);

        cache.set("short", json!(1), Duration::ZERO).await.unwrap();
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.get("long").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_cleanup_clears_entries() {
        let cache = ready_cache().await;
        cache.set("k", json!("v"), DEFAULT_CACHE_TTL).await.unwrap();
        cache.cleanup().await.unwrap();
        assert!(cache.is_empty().await);
        assert!(!cache.health_check().await);
    }
}
