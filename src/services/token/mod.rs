pub mod authority;
pub mod cache_authority;

pub use authority::TokenAuthority;
pub use cache_authority::CacheTokenAuthority;
