//! Consumes tokens minted by the external identity service.

pub(crate) mod claims;
pub(crate) mod extractors;
pub(crate) mod keys;

pub use extractors::CurrentUser;
