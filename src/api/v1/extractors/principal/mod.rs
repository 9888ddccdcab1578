/*!
 * Principal extractor
 *
 * Public API:
 * - Principal
 * - Authorized
 */

mod core;
mod types;

pub use core::Authorized;
pub use types::Principal;
