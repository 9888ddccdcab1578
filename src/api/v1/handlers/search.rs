/*
 * Responsibility
 * - GET /search: query string を ApiParams で絞り込んで返す
 */
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{reply::ApiReply, v1::extractors::api_params::SearchParams};

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub q: String,
    pub params: Map<String, Value>,
}

pub async fn search(params: SearchParams) -> ApiReply {
    // `q` is required, the extractor already rejected requests without it
    let q = params.get_str("q").unwrap_or_default().to_string();

    ApiReply::ok(SearchResponse {
        q,
        params: params.into_inner(),
    })
}
