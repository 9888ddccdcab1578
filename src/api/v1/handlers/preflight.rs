/*
 * Responsibility
 * - OPTIONS (CORS preflight) の応答
 * - CORS ヘッダ自体は middleware::cors が付ける
 */
use axum::response::Response;

use crate::error::{self, codes};

pub async fn preflight() -> Response {
    error::message(codes::PREFLIGHT_REQUEST)
}
