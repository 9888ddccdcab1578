/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route ごとに guard を合成する。内側から順に:
 *   handler → auth / csrf → OPTIONS(preflight) → cors (最外側、拒否応答にもヘッダを付ける)
 */
use axum::{
    Router,
    http::Method,
    routing::{MethodRouter, get, post},
};

use crate::{
    api::v1::handlers::{
        health::health,
        me::{me, me_verified},
        preflight::preflight,
        search::search,
        session::{csrf_form, echo},
    },
    middleware::{
        auth::access::protected,
        cors::{self, CorsError, CorsPolicy},
        csrf,
    },
    services::csrf::CsrfIssuer,
    state::AppState,
};

/// Issuer behind `GET /session/csrf`, paired with `POST /session/echo`.
pub const SESSION_FORM: CsrfIssuer = CsrfIssuer::new("session_form");

const GET_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];
const POST_METHODS: [Method; 2] = [Method::POST, Method::OPTIONS];

fn with_cors(
    route: MethodRouter<AppState>,
    policy: &CorsPolicy,
    methods: &[Method],
) -> Result<MethodRouter<AppState>, CorsError> {
    Ok(cors::apply(route, policy.for_route(methods)?))
}

pub fn routes(state: AppState, policy: &CorsPolicy) -> Result<Router<AppState>, CorsError> {
    let health_route = with_cors(get(health).options(preflight), policy, &GET_METHODS)?;

    // ApiParams answers OPTIONS itself
    let search_route = with_cors(get(search).options(search), policy, &GET_METHODS)?;

    let csrf_form_route = with_cors(
        csrf::issue(get(csrf_form), state.clone(), SESSION_FORM).options(preflight),
        policy,
        &GET_METHODS,
    )?;

    let echo_route = with_cors(
        csrf::require(post(echo), state.clone(), SESSION_FORM).options(preflight),
        policy,
        &POST_METHODS,
    )?;

    let me_route = with_cors(
        protected(get(me), state.clone(), false).options(preflight),
        policy,
        &GET_METHODS,
    )?;

    let me_verified_route = with_cors(
        protected(get(me_verified), state, true).options(preflight),
        policy,
        &GET_METHODS,
    )?;

    Ok(Router::new()
        .route("/health", health_route)
        .route("/search", search_route)
        .route("/session/csrf", csrf_form_route)
        .route("/session/echo", echo_route)
        .route("/me", me_route)
        .route("/me/verified", me_verified_route))
}
