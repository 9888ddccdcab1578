/*
 * Responsibility
 * - GET /me, GET /me/verified
 * - 認可は middleware::auth::access が済ませ、handler は Authorized だけを受け取る
 */
use serde::Serialize;

use crate::api::{reply::ApiReply, v1::extractors::Authorized};

/// Trailing characters of the credential shown back to the caller.
const TOKEN_HINT_LEN: usize = 6;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub owner: String,
    pub is_admin: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_hint: Option<String>,
}

fn token_hint(credential: &str) -> String {
    let skip = credential.chars().count().saturating_sub(TOKEN_HINT_LEN);
    credential.chars().skip(skip).collect()
}

pub async fn me(Authorized(principal): Authorized) -> ApiReply {
    ApiReply::ok(MeResponse {
        owner: principal.owner,
        is_admin: principal.is_admin,
        // admins always pass strong verification before reaching a handler
        verified: principal.is_admin,
        token_hint: None,
    })
}

pub async fn me_verified(Authorized(principal): Authorized) -> ApiReply {
    ApiReply::ok(MeResponse {
        owner: principal.owner,
        is_admin: principal.is_admin,
        verified: true,
        token_hint: Some(token_hint(&principal.credential)),
    })
}
