use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::services::{
    cache::CacheClient,
    token::authority::{TokenAuthority, TokenError, TokenOwner},
};

/// Token record as written by whatever issues credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub owner: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked: bool,
}

impl TokenRecord {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at.is_none_or(|exp| exp > now)
    }
}

/// Reads token records from the shared cache.
///
/// Keys are `token:<sha256-hex(credential)>` so raw credentials never land in the store.
#[derive(Clone)]
pub struct CacheTokenAuthority {
    cache: Arc<dyn CacheClient>,
    prefix: String,
}

impl CacheTokenAuthority {
    pub fn new(cache: Arc<dyn CacheClient>) -> Self {
        Self {
            cache,
            prefix: "token".to_string(),
        }
    }

    pub fn key(&self, credential: &str) -> String {
        let digest = Sha256::digest(credential.as_bytes());
        format!("{}:{:x}", self.prefix, digest)
    }

    async fn record(&self, credential: &str) -> Result<TokenRecord, TokenError> {
        let raw = self
            .cache
            .get_string(&self.key(credential))
            .await?
            .ok_or(TokenError::Unknown)?;

        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl TokenAuthority for CacheTokenAuthority {
    async fn check(&self, credential: &str) -> Result<bool, TokenError> {
        Ok(self.cache.exists(&self.key(credential)).await?)
    }

    async fn owner(&self, credential: &str) -> Result<TokenOwner, TokenError> {
        let record = self.record(credential).await?;
        Ok(TokenOwner {
            owner: record.owner,
            is_admin: record.is_admin,
        })
    }

    async fn verify(&self, credential: &str) -> Result<bool, TokenError> {
        match self.record(credential).await {
            Ok(record) => Ok(record.is_live_at(Utc::now())),
            Err(TokenError::Unknown) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
