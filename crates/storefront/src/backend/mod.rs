//! Backend-as-a-service clients: product document store and identity.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products and customer accounts.
//!   There is no local database and no sync.
//! - Two seams, [`ProductStore`] and [`IdentityProvider`], so handlers never
//!   depend on the transport. [`BackendClient`] implements both over HTTP;
//!   [`MemoryBackend`] implements both in memory for tests and local runs.
//! - Product lookups are cached in memory via `moka` (5 minute TTL).
//!
//! # Example
//!
//! ```rust,ignore
//! use rxshop_storefront::backend::{BackendClient, ProductStore};
//!
//! let client = BackendClient::new(&config.backend);
//! let product = client.get_product(&"aspirin-81".parse()?).await?;
//! ```

mod cache;
mod client;
mod memory;
mod types;

pub use client::BackendClient;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use rxshop_core::{Product, ProductId};
use secrecy::SecretString;
use thiserror::Error;

use crate::models::CurrentCustomer;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A document did not match the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Read access to the product collection.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetch one product by id. `Ok(None)` when the document does not exist.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError>;

    /// Fetch the whole product collection in store order.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Cheap reachability probe for readiness checks.
    async fn health_check(&self) -> Result<(), BackendError>;
}

/// Verifies backend session secrets.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a backend session secret to its customer.
    ///
    /// `Ok(None)` when the secret is unknown or expired.
    async fn verify_session(
        &self,
        secret: &SecretString,
    ) -> Result<Option<CurrentCustomer>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 503: maintenance");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
