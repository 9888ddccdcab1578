/*
 * Responsibility
 * - Config読み込み → tracing 初期化 → 依存生成 → Router 組み立て
 * - Middleware の適用 (HTTP 共通: request id / limits / trace)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::Config,
    middleware::{self, cors::CorsPolicy},
    services::{
        cache::{CacheClient, MemoryCache, ValkeyClient},
        csrf::CsrfStore,
        session::SessionConfig,
        token::CacheTokenAuthority,
    },
    state::AppState,
};

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let state = build_state(&config).await?;
    let cors = CorsPolicy::from_config(&config.cors)?;

    let app = build_router(state, &cors)?;
    let app = middleware::http::apply(app, config.http);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, env = ?config.app_env, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn build_state(config: &Config) -> Result<AppState> {
    let cache: Arc<dyn CacheClient> = match &config.redis_url {
        Some(url) => Arc::new(
            ValkeyClient::new(url)
                .await
                .context("connecting to valkey")?,
        ),
        None => {
            tracing::warn!("REDIS_URL not set; using in-memory cache (development only)");
            Arc::new(MemoryCache::new())
        }
    };

    let key = match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_slice())
            .map_err(|err| anyhow::anyhow!("invalid SESSION_SECRET: {err:?}"))?,
        None => {
            tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
            Key::generate()
        }
    };

    let session = SessionConfig {
        key,
        secure: config.app_env.is_production(),
    };

    Ok(AppState::new(
        CsrfStore::new(cache.clone(), config.csrf_token_ttl),
        Arc::new(CacheTokenAuthority::new(cache)),
        session,
    ))
}

fn build_router(state: AppState, cors: &CorsPolicy) -> Result<Router> {
    Ok(Router::new()
        .nest("/api/v1", api::v1::routes(state.clone(), cors)?)
        .with_state(state))
}
