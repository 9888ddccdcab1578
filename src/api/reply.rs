/*
 * Responsibility
 * - handler の戻り値を統一した JSON レスポンスにする
 *   - 値だけ → 200
 *   - (値, status) → 指定 status
 *   - 組み立て済み Response → そのまま
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, codes};

#[derive(Debug)]
pub enum ApiReply {
    Json(Value, StatusCode),
    Raw(Response),
}

impl ApiReply {
    pub fn ok<T: Serialize>(body: T) -> Self {
        Self::with_status(body, StatusCode::OK)
    }

    pub fn with_status<T: Serialize>(body: T, status: StatusCode) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self::Json(value, status),
            Err(err) => {
                tracing::error!(error = %err, "response serialization failed");
                Self::Raw(AppError::internal(codes::SERVER_SIDE_ERROR).into_response())
            }
        }
    }
}

impl From<Value> for ApiReply {
    fn from(value: Value) -> Self {
        Self::Json(value, StatusCode::OK)
    }
}

impl From<(Value, StatusCode)> for ApiReply {
    fn from((value, status): (Value, StatusCode)) -> Self {
        Self::Json(value, status)
    }
}

impl From<Response> for ApiReply {
    fn from(res: Response) -> Self {
        Self::Raw(res)
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        match self {
            ApiReply::Json(value, status) => (status, Json(value)).into_response(),
            ApiReply::Raw(res) => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::json_body;
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("nope"))
        }
    }

    #[tokio::test]
    async fn plain_value_is_200_json() {
        let res = ApiReply::from(json!({"a": 1})).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"a": 1}));
    }

    #[tokio::test]
    async fn pair_keeps_its_status() {
        let res = ApiReply::from((json!({"a": 1}), StatusCode::CREATED)).into_response();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(json_body(res).await, json!({"a": 1}));
    }

    #[tokio::test]
    async fn prebuilt_response_passes_through() {
        let prebuilt = (StatusCode::ACCEPTED, [("x-custom", "1")], "raw").into_response();
        let res = ApiReply::from(prebuilt).into_response();

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers().get("x-custom").unwrap(), "1");
    }

    #[tokio::test]
    async fn serialization_failure_is_500() {
        let res = ApiReply::ok(Unserializable).into_response();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(res).await,
            json!({"error": "server_side_error_contact_administrator"})
        );
    }
}
