/*
 * Responsibility
 * - GET /health (疎通用)
 */
use serde_json::json;

use crate::api::reply::ApiReply;

pub async fn health() -> ApiReply {
    ApiReply::ok(json!({"status": "ok"}))
}
