//! In-memory backend for tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rxshop_core::{Product, ProductId};
use secrecy::{ExposeSecret, SecretString};

use super::{BackendError, IdentityProvider, ProductStore};
use crate::models::CurrentCustomer;

/// Backend double holding products and sessions in memory.
///
/// Can be switched into an "unavailable" state where every call fails,
/// to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    products: RwLock<Vec<Product>>,
    sessions: RwLock<HashMap<String, CurrentCustomer>>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style product seeding.
    #[must_use]
    pub fn with_product(self, product: Product) -> Self {
        self.insert_product(product);
        self
    }

    /// Builder-style session seeding.
    #[must_use]
    pub fn with_session(self, secret: impl Into<String>, customer: CurrentCustomer) -> Self {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(secret.into(), customer);
        self
    }

    /// Insert or replace a product.
    pub fn insert_product(&self, product: Product) {
        let mut products = self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
    }

    /// Remove a product. Returns `true` if it existed.
    pub fn remove_product(&self, id: &ProductId) -> bool {
        let mut products = self
            .products
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = products.len();
        products.retain(|p| &p.id != id);
        products.len() != before
    }

    /// Make every subsequent call fail with a 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MemoryBackend {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        self.check_available()?;
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.check_available()?;
        Ok(self
            .products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        self.check_available()
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn verify_session(
        &self,
        secret: &SecretString,
    ) -> Result<Option<CurrentCustomer>, BackendError> {
        self.check_available()?;
        Ok(self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(secret.expose_secret())
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rxshop_core::CustomerId;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            category: "Vitamins".to_string(),
            price: Decimal::new(999, 2),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_products_round_trip() {
        let backend = MemoryBackend::new().with_product(product("a"));
        let id = ProductId::parse("a").unwrap();

        assert!(backend.get_product(&id).await.unwrap().is_some());
        assert!(backend.remove_product(&id));
        assert!(backend.get_product(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions() {
        let customer = CurrentCustomer {
            id: CustomerId::new("u1"),
            email: "pat@example.org".to_string(),
            name: None,
        };
        let backend = MemoryBackend::new().with_session("s3cret", customer.clone());

        let found = backend
            .verify_session(&SecretString::from("s3cret"))
            .await
            .unwrap();
        assert_eq!(found, Some(customer));

        let missing = backend
            .verify_session(&SecretString::from("nope"))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let backend = MemoryBackend::new();
        backend.set_unavailable(true);
        assert!(backend.list_products().await.is_err());
        assert!(backend.health_check().await.is_err());
    }
}
