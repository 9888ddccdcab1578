pub mod store;

pub use store::{CsrfRecord, CsrfStore};

/// Identity of an issuing route. A verifying guard is paired with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrfIssuer {
    name: &'static str,
}

impl CsrfIssuer {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
