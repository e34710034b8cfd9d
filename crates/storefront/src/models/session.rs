//! Session-related types.
//!
//! Types stored in the server-side session for authentication state.

use serde::{Deserialize, Serialize};

use rxshop_core::CustomerId;

/// Session-stored customer identity.
///
/// Minimal data stored in the session once the identity provider has
/// verified the customer's backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer id from the identity provider.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: String,
    /// Display name, if the customer set one.
    #[serde(default)]
    pub name: Option<String>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";
}
