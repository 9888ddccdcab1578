//! `Authorization: Token <base64>` 検証 → Principal を extensions に入れる
//!
//! Two tiers:
//! - format check (base64, exactly 128 decoded bytes) + `TokenAuthority::check` on every call
//! - `TokenAuthority::verify` only when the route asks for it or the owner is an admin
//!
//! Every failure is `403 no_permission`. The cause is logged, never returned.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::api::v1::extractors::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// Decoded credential length every bearer token must have.
pub const CREDENTIAL_LEN: usize = 128;

const SCHEME: &str = "token";

#[derive(Clone)]
struct AccessState {
    app: AppState,
    verify: bool,
}

/// Protect `route`. `verify = true` forces the strong verification tier for everyone.
///
/// 例：
/// ```ignore
/// let route = middleware::auth::access::protected(get(me), state.clone(), false);
/// ```
pub fn protected<S>(route: MethodRouter<S>, state: AppState, verify: bool) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    route.layer(middleware::from_fn_with_state(
        AccessState { app: state, verify },
        access_middleware,
    ))
}

#[derive(Debug, PartialEq, Eq)]
pub enum CredentialError {
    Malformed,
    NotBase64,
    WrongLength(usize),
}

/// Split `Token <credential>` and check the credential's shape.
///
/// Returns the raw (still encoded) credential.
pub fn parse_authorization(value: &str) -> Result<&str, CredentialError> {
    let (scheme, credential) = value.split_once(' ').ok_or(CredentialError::Malformed)?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(CredentialError::Malformed);
    }

    let decoded = STANDARD
        .decode(credential)
        .map_err(|_| CredentialError::NotBase64)?;
    if decoded.len() != CREDENTIAL_LEN {
        return Err(CredentialError::WrongLength(decoded.len()));
    }

    Ok(credential)
}

async fn access_middleware(
    State(access): State<AccessState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("authorization header missing");
            AppError::Forbidden
        })?;

    let credential = parse_authorization(auth)
        .map_err(|err| {
            tracing::warn!(error = ?err, "malformed credential");
            AppError::Forbidden
        })?
        .to_string();

    let tokens = &access.app.tokens;

    match tokens.check(&credential).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("credential rejected by token check");
            return Err(AppError::Forbidden);
        }
        Err(err) => {
            tracing::warn!(error = ?err, "token check failed");
            return Err(AppError::Forbidden);
        }
    }

    let owner = tokens.owner(&credential).await.map_err(|err| {
        tracing::warn!(error = ?err, "token owner lookup failed");
        AppError::Forbidden
    })?;

    if access.verify || owner.is_admin {
        match tokens.verify(&credential).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(owner = %owner.owner, "credential failed strong verification");
                return Err(AppError::Forbidden);
            }
            Err(err) => {
                tracing::warn!(error = ?err, "token verification failed");
                return Err(AppError::Forbidden);
            }
        }
    }

    let principal = Principal {
        owner: owner.owner,
        credential,
        is_admin: owner.is_admin,
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
