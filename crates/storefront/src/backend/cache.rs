//! Cache types for product lookups.

use std::sync::Arc;

use rxshop_core::{Product, ProductId};

/// Cache key for product lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Catalog,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Arc<Product>),
    Catalog(Arc<Vec<Product>>),
}
