pub mod api_params;
pub mod principal;

pub use principal::{Authorized, Principal};
