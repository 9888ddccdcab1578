/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - csrf: CsrfStore, tokens: TokenAuthority, session: SessionConfig
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{csrf::CsrfStore, session::SessionConfig, token::TokenAuthority};

#[derive(Clone)]
pub struct AppState {
    pub csrf: CsrfStore,
    pub tokens: Arc<dyn TokenAuthority>,
    pub session: SessionConfig,
}

impl AppState {
    pub fn new(csrf: CsrfStore, tokens: Arc<dyn TokenAuthority>, session: SessionConfig) -> Self {
        Self {
            csrf,
            tokens,
            session,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("csrf_backend", &self.csrf.backend_name())
            .field("session", &self.session)
            .finish()
    }
}
