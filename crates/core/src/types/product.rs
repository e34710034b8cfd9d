//! Catalog product as served by the backend document store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image URL, if the product has one.
    #[serde(default)]
    pub image: Option<String>,
}
