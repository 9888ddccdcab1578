/*
 * Responsibility
 * - エンドポイントごとの「受け付けるキー」を宣言する
 * - 増えるのはここだけ (decode / extractor 実装は core.rs)
 */
use super::core::{ApiKeys, ApiParams, InputSource};

// GET /search
pub enum SearchKeys {}

impl ApiKeys for SearchKeys {
    const REQUIRED: &'static [&'static str] = &["q"];
    const ACCEPTABLE: &'static [&'static str] = &["page", "per_page"];
}

pub type SearchParams = ApiParams<SearchKeys>;

// POST /session/echo
pub enum EchoKeys {}

impl ApiKeys for EchoKeys {
    const REQUIRED: &'static [&'static str] = &["message"];
    const ACCEPTABLE: &'static [&'static str] = &["tag"];
    const INPUT: InputSource = InputSource::Json;
}

pub type EchoParams = ApiParams<EchoKeys>;
