//! Per-client session carried in a signed cookie.
//!
//! The session only holds the current CSRF token reference. It is built from the
//! request headers by whoever needs it and written back through the cookie jar,
//! so there is no ambient session object.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

/// Cookie settings shared by every request.
#[derive(Clone)]
pub struct SessionConfig {
    pub key: Key,
    // `Secure` attribute (HTTPS only), on in production
    pub secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("SessionConfig")
            .field("secure", &self.secure)
            .finish()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub csrf_token: Option<String>,
}

pub struct Session {
    jar: SignedCookieJar,
    data: SessionData,
    secure: bool,
}

impl Session {
    /// Read the session from the request. A missing, tampered or undecodable cookie
    /// yields an empty session.
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Self {
        let jar = SignedCookieJar::from_headers(headers, config.key.clone());

        let data = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| decode(cookie.value()))
            .unwrap_or_default();

        Self {
            jar,
            data,
            secure: config.secure,
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.data.csrf_token.as_deref()
    }

    /// Replace the current token reference (one active token per session).
    pub fn set_csrf_token(&mut self, token: String) {
        self.data.csrf_token = Some(token);
    }

    /// Serialize the session back into a signed cookie.
    pub fn into_jar(self) -> SignedCookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, encode(&self.data)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);

        self.jar.add(cookie)
    }
}

fn encode(data: &SessionData) -> String {
    // SessionData only holds strings; serialization cannot fail.
    let json = serde_json::to_vec(data).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(raw: &str) -> Option<SessionData> {
    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::debug!(error = ?err, "discarding undecodable session cookie");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use axum::response::IntoResponse;

    fn config() -> SessionConfig {
        SessionConfig {
            key: Key::generate(),
            secure: false,
        }
    }

    fn cookie_header_from(jar: SignedCookieJar) -> HeaderMap {
        let res = jar.into_response();
        let mut headers = HeaderMap::new();
        for value in res.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().to_string();
            headers.append(header::COOKIE, pair.parse().unwrap());
        }
        headers
    }

    #[test]
    fn empty_headers_give_empty_session() {
        let session = Session::from_headers(&HeaderMap::new(), &config());
        assert_eq!(session.csrf_token(), None);
    }

    #[test]
    fn token_survives_a_cookie_roundtrip() {
        let config = config();
        let mut session = Session::from_headers(&HeaderMap::new(), &config);
        session.set_csrf_token("abc123".into());

        let headers = cookie_header_from(session.into_jar());
        let reread = Session::from_headers(&headers, &config);

        assert_eq!(reread.csrf_token(), Some("abc123"));
    }

    #[test]
    fn cookie_signed_with_another_key_is_ignored() {
        let mut session = Session::from_headers(&HeaderMap::new(), &config());
        session.set_csrf_token("abc123".into());
        let headers = cookie_header_from(session.into_jar());

        let reread = Session::from_headers(&headers, &config());

        assert_eq!(reread.csrf_token(), None);
    }

    #[test]
    fn unsigned_forged_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        let forged = encode(&SessionData {
            csrf_token: Some("forged".into()),
        });
        headers.insert(
            header::COOKIE,
            format!("{SESSION_COOKIE}={forged}").parse().unwrap(),
        );

        let session = Session::from_headers(&headers, &config());

        assert_eq!(session.csrf_token(), None);
    }
}
