pub mod health;
pub mod me;
pub mod preflight;
pub mod search;
pub mod session;
