//! Cache client interface used by higher-level services (CSRF bookkeeping, token lookup).
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/serialization).
///
/// Note:
/// - Kept independent from `AppError` so callers decide how to fail.
///   Both CSRF and token checks fail closed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal, string-based cache interface.
///
/// - CSRF issuance needs `SET` (optionally with TTL), verification needs `EXISTS` + `GET`.
/// - Token lookup uses the same three operations.
///
/// Object safe so the backend can be picked at startup (`Arc<dyn CacheClient>`).
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value unconditionally. `ttl: None` keeps the key until the backend evicts it.
    async fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;
}
