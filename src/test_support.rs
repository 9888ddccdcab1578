//! Shared fixtures for unit tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::to_bytes,
    http::{HeaderMap, header},
    response::Response,
};
use axum_extra::extract::cookie::Key;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::services::{
    cache::{CacheClient, CacheError, MemoryCache, client::CacheResult},
    csrf::CsrfStore,
    session::{Session, SessionConfig},
    token::authority::{TokenAuthority, TokenError, TokenOwner},
};
use crate::state::AppState;

pub async fn json_body(res: Response) -> serde_json::Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` of the first `Set-Cookie`, ready for a `Cookie` request header.
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// CSRF token stored in a cookie produced by `session_cookie`.
pub fn session_token(cookie: &str, config: &SessionConfig) -> String {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, cookie.parse().unwrap());
    Session::from_headers(&headers, config)
        .csrf_token()
        .unwrap()
        .to_string()
}

pub fn credential_of_len(len: usize) -> String {
    STANDARD.encode(vec![0x5a_u8; len])
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        key: Key::generate(),
        secure: false,
    }
}

pub fn state_with_cache(cache: Arc<dyn CacheClient>) -> AppState {
    AppState::new(
        CsrfStore::new(cache, None),
        Arc::new(StubAuthority::user("alice")),
        session_config(),
    )
}

pub fn state_with_authority(authority: Arc<StubAuthority>) -> AppState {
    AppState::new(
        CsrfStore::new(Arc::new(MemoryCache::new()), None),
        authority,
        session_config(),
    )
}

/// Cache whose backend is always down.
pub struct FailingCache;

#[async_trait]
impl CacheClient for FailingCache {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn get_string(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::BackendConnection("connection refused".into()))
    }

    async fn set_string(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Option<Duration>,
    ) -> CacheResult<()> {
        Err(CacheError::BackendConnection("connection refused".into()))
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Err(CacheError::BackendConnection("connection refused".into()))
    }
}

/// Tier at which `StubAuthority` reports a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingTier {
    Check,
    Owner,
}

fn backend_down() -> TokenError {
    TokenError::Cache(CacheError::BackendConnection("connection refused".into()))
}

/// Token module double that counts calls per tier.
pub struct StubAuthority {
    owner: TokenOwner,
    known: bool,
    verified: bool,
    failing: Option<FailingTier>,
    check_calls: AtomicUsize,
    owner_calls: AtomicUsize,
    verify_calls: AtomicUsize,
}

impl StubAuthority {
    fn new(owner: &str, is_admin: bool) -> Self {
        Self {
            owner: TokenOwner {
                owner: owner.to_string(),
                is_admin,
            },
            known: true,
            verified: true,
            failing: None,
            check_calls: AtomicUsize::new(0),
            owner_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
        }
    }

    pub fn user(owner: &str) -> Self {
        Self::new(owner, false)
    }

    pub fn admin(owner: &str) -> Self {
        Self::new(owner, true)
    }

    pub fn rejecting() -> Self {
        Self {
            known: false,
            ..Self::user("nobody")
        }
    }

    pub fn unverified(self) -> Self {
        Self {
            verified: false,
            ..self
        }
    }

    pub fn failing_at(self, tier: FailingTier) -> Self {
        Self {
            failing: Some(tier),
            ..self
        }
    }

    pub fn owner_calls(&self) -> usize {
        self.owner_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.check_calls() + self.owner_calls() + self.verify_calls()
    }
}

#[async_trait]
impl TokenAuthority for StubAuthority {
    async fn check(&self, _credential: &str) -> Result<bool, TokenError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(FailingTier::Check) {
            return Err(backend_down());
        }
        Ok(self.known)
    }

    async fn owner(&self, _credential: &str) -> Result<TokenOwner, TokenError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(FailingTier::Owner) {
            return Err(backend_down());
        }
        if self.known {
            Ok(self.owner.clone())
        } else {
            Err(TokenError::Unknown)
        }
    }

    async fn verify(&self, _credential: &str) -> Result<bool, TokenError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.known && self.verified)
    }
}
