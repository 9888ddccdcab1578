//! CORS header injection for browser clients.
//!
//! Note:
//! - Headers are attached to every response of a route, not only to preflights,
//!   and also to rejections produced by inner guards.
//! - Allowed methods default to the methods the route itself declares.
//!
//! Responsibility:
//! - Turn `CorsConfig` into header values once at startup.
//! - Append the five Access-Control headers per route.

use std::sync::Arc;

use axum::{
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, header,
        header::{InvalidHeaderName, InvalidHeaderValue},
    },
    middleware,
    response::Response,
    routing::MethodRouter,
};

use crate::config::CorsConfig;

/// Headers every route accepts on top of the configured ones.
const ALWAYS_ALLOWED_HEADERS: [HeaderName; 4] = [
    header::AUTHORIZATION,
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::COOKIE,
];

#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    #[error("invalid CORS header value: {0}")]
    HeaderValue(#[from] InvalidHeaderValue),
    #[error("invalid CORS header name: {0}")]
    HeaderName(#[from] InvalidHeaderName),
    #[error("invalid CORS method: {0}")]
    Method(String),
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origin: HeaderValue,
    // Empty => route methods
    allowed_methods: Vec<Method>,
    allowed_headers: Vec<HeaderName>,
    allow_credentials: bool,
    exposed_headers: Vec<HeaderName>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            origin: HeaderValue::from_static("*"),
            allowed_methods: Vec::new(),
            allowed_headers: ALWAYS_ALLOWED_HEADERS.to_vec(),
            allow_credentials: true,
            exposed_headers: Vec::new(),
        }
    }
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsError> {
        let origin = HeaderValue::from_str(&config.origin)?;

        let allowed_methods = config
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .map_err(|_| CorsError::Method(m.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut allowed_headers = config
            .allowed_headers
            .iter()
            .map(|h| HeaderName::from_bytes(h.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        for always in ALWAYS_ALLOWED_HEADERS {
            if !allowed_headers.contains(&always) {
                allowed_headers.push(always);
            }
        }

        let exposed_headers = config
            .exposed_headers
            .iter()
            .map(|h| HeaderName::from_bytes(h.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            origin,
            allowed_methods,
            allowed_headers,
            allow_credentials: config.allow_credentials,
            exposed_headers,
        })
    }

    /// Resolve the header set for a route declaring `route_methods`.
    pub fn for_route(&self, route_methods: &[Method]) -> Result<CorsHeaders, CorsError> {
        let methods: &[Method] = if self.allowed_methods.is_empty() {
            route_methods
        } else {
            &self.allowed_methods
        };

        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_str(&join(self.allowed_headers.iter().map(HeaderName::as_str)))?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_str(&join(methods.iter().map(Method::as_str)))?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(if self.allow_credentials { "true" } else { "false" }),
        );
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_str(&join(self.exposed_headers.iter().map(HeaderName::as_str)))?,
        );

        Ok(CorsHeaders(Arc::new(headers)))
    }
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// Pre-rendered Access-Control headers for one route.
#[derive(Debug, Clone)]
pub struct CorsHeaders(Arc<HeaderMap>);

impl CorsHeaders {
    #[cfg(test)]
    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.0.get(name)
    }

    /// Append (never replace) so headers already set by the handler survive.
    pub fn inject(&self, mut res: Response) -> Response {
        let target = res.headers_mut();
        for (name, value) in self.0.iter() {
            target.append(name.clone(), value.clone());
        }
        res
    }
}

/// Wrap `route` so every response carries `headers`.
///
/// Apply this last (outermost) so rejections from CSRF/auth guards get the headers too.
pub fn apply<S>(route: MethodRouter<S>, headers: CorsHeaders) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.layer(middleware::map_response(move |res: Response| {
        let headers = headers.clone();
        async move { headers.inject(res) }
    }))
}
