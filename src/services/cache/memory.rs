use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

type Entry = (String, Option<Instant>);

/// Process-local cache. Development fallback when no `REDIS_URL` is configured,
/// and the default backend in tests.
///
/// Expiry is checked lazily on read; nothing sweeps expired keys.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    fn live_value(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::BackendConnection("memory cache poisoned".into()))?;

        let expired = match entries.get(key) {
            Some((_, Some(deadline))) => *deadline <= Instant::now(),
            Some((_, None)) => false,
            None => return Ok(None),
        };

        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        self.live_value(key)
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .map_err(|_| CacheError::BackendConnection("memory cache poisoned".into()))?
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.live_value(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_and_exists() {
        let cache = MemoryCache::new();
        cache.set_string("k", "v", None).await.unwrap();

        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("v"));
        assert!(cache.exists("k").await.unwrap());
        assert!(!cache.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let cache = MemoryCache::new();
        cache.set_string("k", "old", None).await.unwrap();
        cache.set_string("k", "new", None).await.unwrap();

        assert_eq!(cache.get_string("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn expired_entries_disappear() {
        let cache = MemoryCache::new();
        cache
            .set_string("k", "v", Some(Duration::from_millis(0)))
            .await
            .unwrap();

        assert!(!cache.exists("k").await.unwrap());
        assert_eq!(cache.get_string("k").await.unwrap(), None);
    }
}
