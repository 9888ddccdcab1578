//! CSRF guards: issue a token on one route, require it on another.
//!
//! Issue:
//! - store `{issuer, useragent}` under a fresh token, fail 500 before the handler runs
//!   if the store is down
//! - run the handler, then remember the token in the session cookie
//!
//! Require (paired with the same `CsrfIssuer` value):
//! - session token present → record present → issuer equal → user-agent equal
//! - any miss is `400 csrf_verification_failed`; the reason only goes to the log
//!
//! Tokens are not consumed on success.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};

use crate::error::{AppError, codes};
use crate::services::{
    csrf::{CsrfIssuer, CsrfRecord},
    session::Session,
};
use crate::state::AppState;

#[derive(Clone)]
struct CsrfGuardState {
    app: AppState,
    issuer: CsrfIssuer,
}

/// Make `route` issue a CSRF token on every call.
pub fn issue<S>(route: MethodRouter<S>, state: AppState, issuer: CsrfIssuer) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = CsrfGuardState { app: state, issuer };
    route.layer(middleware::from_fn_with_state(guard, issue_middleware))
}

/// Make `route` require a token previously issued by `issuer`.
pub fn require<S>(route: MethodRouter<S>, state: AppState, issuer: CsrfIssuer) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = CsrfGuardState { app: state, issuer };
    route.layer(middleware::from_fn_with_state(guard, require_middleware))
}

/// `User-Agent` decoded byte-for-byte as latin-1. Only a missing header maps to `""`.
fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .map(|v| v.as_bytes().iter().map(|&b| char::from(b)).collect())
        .unwrap_or_default()
}

async fn issue_middleware(
    State(guard): State<CsrfGuardState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let record = CsrfRecord {
        issuer: guard.issuer.name().to_string(),
        useragent: user_agent(req.headers()),
    };

    let token = guard.app.csrf.issue(&record).await.map_err(|err| {
        tracing::error!(error = ?err, issuer = guard.issuer.name(), "csrf issue failed");
        AppError::internal(codes::CSRF_ISSUE_FAILED)
    })?;

    let mut session = Session::from_headers(req.headers(), &guard.app.session);

    let res = next.run(req).await;

    session.set_csrf_token(token);
    Ok((session.into_jar(), res).into_response())
}

async fn require_middleware(
    State(guard): State<CsrfGuardState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let rejected = || AppError::bad_request(codes::CSRF_VERIFICATION_FAILED);

    let session = Session::from_headers(req.headers(), &guard.app.session);
    let Some(token) = session.csrf_token() else {
        tracing::warn!(issuer = guard.issuer.name(), "csrf token missing from session");
        return Err(rejected());
    };

    let record = guard.app.csrf.lookup(token).await.map_err(|err| {
        tracing::warn!(error = ?err, issuer = guard.issuer.name(), "csrf lookup failed");
        rejected()
    })?;

    if record.issuer != guard.issuer.name() {
        tracing::warn!(
            expected = guard.issuer.name(),
            actual = %record.issuer,
            "csrf issuer mismatch"
        );
        return Err(rejected());
    }

    if record.useragent != user_agent(req.headers()) {
        tracing::warn!(issuer = guard.issuer.name(), "csrf user-agent mismatch");
        return Err(rejected());
    }

    Ok(next.run(req).await)
}
