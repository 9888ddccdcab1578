pub mod reply;
pub mod v1;
