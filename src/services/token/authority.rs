use async_trait::async_trait;

use crate::services::cache::CacheError;

/// Identity a credential resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOwner {
    pub owner: String,
    pub is_admin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("unknown credential")]
    Unknown,

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("malformed token record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// External token module.
///
/// Two tiers:
/// - `check` is the cheap existence test gating every protected route.
/// - `verify` is the stronger test, only run for admins or routes that ask for it.
///
/// Any `Err` must be treated as a rejection by the caller (fail-closed).
#[async_trait]
pub trait TokenAuthority: Send + Sync + 'static {
    async fn check(&self, credential: &str) -> Result<bool, TokenError>;

    async fn owner(&self, credential: &str) -> Result<TokenOwner, TokenError>;

    async fn verify(&self, credential: &str) -> Result<bool, TokenError>;
}
