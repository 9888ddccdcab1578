/*
 * Responsibility
 * - 環境変数や設定の読み込み (REDIS_URL, SESSION_SECRET, CORS, HTTP limits など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raw CORS settings. Turned into header values by `middleware::cors::CorsPolicy`.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub origin: String,
    // Empty means "use the methods the route itself declares".
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub exposed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origin: "*".to_string(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: true,
            exposed_headers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None => in-memory cache (development only)
    pub redis_url: Option<String>,
    // None => random key per process (development only)
    pub session_secret: Option<Vec<u8>>,

    pub csrf_token_ttl: Option<Duration>,

    pub cors: CorsConfig,
    pub http: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let redis_url = non_empty_var("REDIS_URL");
        if redis_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        let session_secret = match non_empty_var("SESSION_SECRET") {
            // cookie::Key requires at least 64 bytes of key material
            Some(secret) if secret.len() < 64 => return Err(ConfigError::Invalid("SESSION_SECRET")),
            Some(secret) => Some(secret.into_bytes()),
            None if app_env.is_production() => return Err(ConfigError::Missing("SESSION_SECRET")),
            None => None,
        };

        let csrf_token_ttl = match non_empty_var("CSRF_TOKEN_TTL_SECONDS") {
            Some(raw) => Some(Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("CSRF_TOKEN_TTL_SECONDS"))?,
            )),
            None => None,
        };

        let defaults = CorsConfig::default();
        let cors = CorsConfig {
            origin: non_empty_var("CORS_ALLOW_ORIGIN").unwrap_or(defaults.origin),
            allowed_methods: list_var("CORS_ALLOW_METHODS"),
            allowed_headers: list_var("CORS_ALLOW_HEADERS"),
            allow_credentials: match non_empty_var("CORS_ALLOW_CREDENTIALS") {
                Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("CORS_ALLOW_CREDENTIALS"))?,
                None => defaults.allow_credentials,
            },
            exposed_headers: list_var("CORS_EXPOSE_HEADERS"),
        };

        let http_defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: std::env::var("HTTP_BODY_LIMIT_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(http_defaults.body_limit_bytes),
            timeout: std::env::var("HTTP_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(http_defaults.timeout),
        };

        Ok(Self {
            addr,
            app_env,
            redis_url,
            session_secret,
            csrf_token_ttl,
            cors,
            http,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn list_var(key: &str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_default())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
