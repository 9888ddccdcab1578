pub mod cache;
pub mod csrf;
pub mod session;
pub mod token;
