/*
 * Responsibility
 * - GET /session/csrf: CSRF token 発行 (発行自体は middleware::csrf::issue)
 * - POST /session/echo: CSRF 検証済み + JSON 絞り込み済みの入力をそのまま返す
 */
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::api::{reply::ApiReply, v1::extractors::api_params::EchoParams};

pub async fn csrf_form() -> ApiReply {
    ApiReply::ok(json!({"status": "issued"}))
}

pub async fn echo(params: EchoParams) -> ApiReply {
    ApiReply::from((Value::Object(params.into_inner()), StatusCode::CREATED))
}
