/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - middleware (auth::access) が検証して request extensions に格納し、handler はこの型だけを受け取る
 */

/// Who is calling, as resolved by the token module.
///
/// - `owner` is whatever identity the token module hands back
/// - `credential` is the raw (still base64-encoded) token, for handlers that need to
///   pass it on
#[derive(Debug, Clone)]
pub struct Principal {
    pub owner: String,
    pub credential: String,
    pub is_admin: bool,
}
