/*
 * Responsibility
 * - query string / JSON body を受け、ApiKeys で宣言されたキーだけに絞り込む
 * - 必須キー不足・JSON 形式不正は 400 へ変換 (body サイズ超過だけは 413 のまま返す)
 * - OPTIONS (preflight) はここで 200 を返して handler まで進ませない
 *
 * 置くもの
 *  - ApiParams<K> の定義と FromRequest 実装
 *  - 絞り込みの純粋関数 (filter_params)
 * 置かないもの
 *  - 具体的なエンドポイントのキー定義 (types.rs)
 */
use std::marker::PhantomData;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::error::{self, AppError, codes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    QueryString,
    Json,
}

/// Key declaration for one endpoint.
///
/// Keys are matched case-sensitively and forwarded lowercased, so declare them in
/// lowercase unless a client really sends mixed case.
pub trait ApiKeys: Send + Sync + 'static {
    const REQUIRED: &'static [&'static str];
    const ACCEPTABLE: &'static [&'static str] = &[];
    const INPUT: InputSource = InputSource::QueryString;
}

pub struct ApiParams<K> {
    pub params: Map<String, Value>,
    _marker: PhantomData<K>,
}

impl<K> ApiParams<K> {
    fn new(params: Map<String, Value>) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.params
    }
}

impl<K> std::fmt::Debug for ApiParams<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiParams")
            .field("params", &self.params)
            .finish()
    }
}

pub enum ParamsRejection {
    Preflight,
    Invalid(AppError),
    /// Body exceeded the configured length limit.
    TooLarge(BytesRejection),
}

impl IntoResponse for ParamsRejection {
    fn into_response(self) -> Response {
        match self {
            ParamsRejection::Preflight => error::message(codes::PREFLIGHT_REQUEST),
            ParamsRejection::Invalid(err) => err.into_response(),
            ParamsRejection::TooLarge(rejection) => rejection.into_response(),
        }
    }
}

impl From<AppError> for ParamsRejection {
    fn from(err: AppError) -> Self {
        ParamsRejection::Invalid(err)
    }
}

/// Keep `(required ∪ acceptable) ∩ provided`, lowercase the keys, and make sure
/// every required key survived.
///
/// The first occurrence of a key wins.
pub fn filter_params<I>(
    required: &[&str],
    acceptable: &[&str],
    provided: I,
) -> Result<Map<String, Value>, AppError>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut out = Map::new();
    for (key, value) in provided {
        if required.contains(&key.as_str()) || acceptable.contains(&key.as_str()) {
            out.entry(key.to_lowercase()).or_insert(value);
        }
    }

    if !required.iter().all(|key| out.contains_key(*key)) {
        return Err(AppError::bad_request(codes::NO_REQUIRED_ARGS));
    }

    Ok(out)
}

fn query_pairs(query: &str) -> Vec<(String, Value)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

fn json_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::bad_request(codes::DICTIONARY_REQUIRED)),
        Err(err) => {
            tracing::debug!(error = %err, "json body parse failed");
            Err(AppError::bad_request(codes::DICTIONARY_REQUIRED))
        }
    }
}

impl<K, S> FromRequest<S> for ApiParams<K>
where
    K: ApiKeys,
    S: Send + Sync,
{
    type Rejection = ParamsRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() == Method::OPTIONS {
            return Err(ParamsRejection::Preflight);
        }

        let provided: Vec<(String, Value)> = match K::INPUT {
            InputSource::QueryString => query_pairs(req.uri().query().unwrap_or_default()),
            InputSource::Json => {
                let body = Bytes::from_request(req, state).await.map_err(|rejection| {
                    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                        return ParamsRejection::TooLarge(rejection);
                    }
                    tracing::debug!(error = %rejection, "reading request body failed");
                    AppError::bad_request(codes::DICTIONARY_REQUIRED).into()
                })?;
                json_object(&body)?.into_iter().collect()
            }
        };

        let params = filter_params(K::REQUIRED, K::ACCEPTABLE, provided)?;
        Ok(Self::new(params))
    }
}
