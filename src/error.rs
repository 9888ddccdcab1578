/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 外部に返すのは固定の error code のみ (内部の原因は tracing 側に残す)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Fixed error/message codes that make up the wire contract.
pub mod codes {
    pub const NO_REQUIRED_ARGS: &str = "no_required_args";
    pub const DICTIONARY_REQUIRED: &str = "dictionary_required";
    pub const SERVER_SIDE_ERROR: &str = "server_side_error_contact_administrator";
    pub const CSRF_ISSUE_FAILED: &str = "csrf_issue_failed";
    pub const CSRF_VERIFICATION_FAILED: &str = "csrf_verification_failed";
    pub const NO_PERMISSION: &str = "no_permission";
    pub const PREFLIGHT_REQUEST: &str = "preflight_request";
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {code}")]
    BadRequest { code: &'static str },
    #[error("forbidden")]
    Forbidden,
    #[error("internal server error: {code}")]
    Internal { code: &'static str },
}

impl AppError {
    pub fn bad_request(code: &'static str) -> Self {
        Self::BadRequest { code }
    }

    pub fn internal(code: &'static str) -> Self {
        Self::Internal { code }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code } | AppError::Internal { code } => code,
            AppError::Forbidden => codes::NO_PERMISSION,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.code() };
        (self.status(), Json(body)).into_response()
    }
}

/// `200 {"message": <code>}`
pub fn message(code: &'static str) -> Response {
    (StatusCode::OK, Json(MessageResponse { message: code })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::json_body;

    #[tokio::test]
    async fn forbidden_renders_no_permission() {
        let res = AppError::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(res).await, serde_json::json!({"error": "no_permission"}));
    }

    #[tokio::test]
    async fn internal_keeps_its_code() {
        let res = AppError::internal(codes::CSRF_ISSUE_FAILED).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await, serde_json::json!({"error": "csrf_issue_failed"}));
    }

    #[tokio::test]
    async fn message_is_ok_with_message_body() {
        let res = message(codes::PREFLIGHT_REQUEST);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            json_body(res).await,
            serde_json::json!({"message": "preflight_request"})
        );
    }
}
