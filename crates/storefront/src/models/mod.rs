//! Domain models for the storefront service.

pub mod session;

pub use session::{CurrentCustomer, keys as session_keys};
