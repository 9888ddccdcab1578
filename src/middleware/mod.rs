/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: router 全体 / cors, csrf, auth: route 単位で合成する
 */
pub mod auth;
pub mod cors;
pub mod csrf;
pub mod http;
