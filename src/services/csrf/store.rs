use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::cache::{CacheClient, CacheError};

/// What the store remembers about an issued CSRF token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfRecord {
    pub issuer: String,
    pub useragent: String,
}

/// Typed lookup failures. The HTTP layer collapses all of them into one generic
/// client-facing code, but logs keep the distinction.
#[derive(Debug, thiserror::Error)]
pub enum CsrfStoreError {
    #[error("csrf token not found")]
    NotFound,

    #[error("csrf store unreachable: {0}")]
    Unavailable(#[from] CacheError),

    #[error("malformed csrf record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Cache-backed CSRF bookkeeping.
///
/// Tokens are never deleted here. Lifetime is whatever the backend does, or
/// `ttl` when configured.
#[derive(Clone)]
pub struct CsrfStore {
    cache: Arc<dyn CacheClient>,
    // Key prefix to avoid collisions with other users of the same cache
    prefix: String,
    ttl: Option<Duration>,
}

impl CsrfStore {
    pub fn new(cache: Arc<dyn CacheClient>, ttl: Option<Duration>) -> Self {
        Self::new_with_prefix(cache, "csrf", ttl)
    }

    pub fn new_with_prefix(
        cache: Arc<dyn CacheClient>,
        prefix: impl Into<String>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token)
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Generate a fresh token and persist `record` under it.
    pub async fn issue(&self, record: &CsrfRecord) -> Result<String, CsrfStoreError> {
        let token = Uuid::new_v4().simple().to_string();
        let value = serde_json::to_string(record)?;

        self.cache
            .set_string(&self.key(&token), &value, self.ttl)
            .await?;

        Ok(token)
    }

    pub async fn lookup(&self, token: &str) -> Result<CsrfRecord, CsrfStoreError> {
        let key = self.key(token);

        if !self.cache.exists(&key).await? {
            return Err(CsrfStoreError::NotFound);
        }

        // The key can expire between EXISTS and GET.
        let raw = self
            .cache
            .get_string(&key)
            .await?
            .ok_or(CsrfStoreError::NotFound)?;

        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::MemoryCache;
    use crate::test_support::FailingCache;

    fn record() -> CsrfRecord {
        CsrfRecord {
            issuer: "login".into(),
            useragent: "test-agent/1.0".into(),
        }
    }

    #[tokio::test]
    async fn issued_token_is_32_hex_chars_and_resolves() {
        let store = CsrfStore::new(Arc::new(MemoryCache::new()), None);

        let token = store.issue(&record()).await.unwrap();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(store.lookup(&token).await.unwrap(), record());
    }

    #[tokio::test]
    async fn every_issue_yields_a_new_token() {
        let store = CsrfStore::new(Arc::new(MemoryCache::new()), None);

        let a = store.issue(&record()).await.unwrap();
        let b = store.issue(&record()).await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn record_is_stored_under_prefixed_key() {
        let cache = MemoryCache::new();
        let store = CsrfStore::new(Arc::new(cache.clone()), None);

        let token = store.issue(&record()).await.unwrap();

        assert!(cache.exists(&format!("csrf:{token}")).await.unwrap());
        assert!(!cache.exists(&token).await.unwrap());
    }

    #[tokio::test]
    async fn lookup_distinguishes_failure_kinds() {
        let cache = MemoryCache::new();
        let store = CsrfStore::new(Arc::new(cache.clone()), None);

        assert!(matches!(
            store.lookup("nope").await,
            Err(CsrfStoreError::NotFound)
        ));

        cache.set_string("csrf:bad", "not json", None).await.unwrap();
        assert!(matches!(
            store.lookup("bad").await,
            Err(CsrfStoreError::Malformed(_))
        ));

        let broken = CsrfStore::new(Arc::new(FailingCache), None);
        assert!(matches!(
            broken.lookup("any").await,
            Err(CsrfStoreError::Unavailable(_))
        ));
        assert!(matches!(
            broken.issue(&record()).await,
            Err(CsrfStoreError::Unavailable(_))
        ));
    }
}
