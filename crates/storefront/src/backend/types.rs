//! Wire types for backend documents.
//!
//! Documents carry their id in `$id` alongside the collection attributes.
//! These types stay private to the client; handlers see [`Product`] and
//! [`CurrentCustomer`].

use rust_decimal::Decimal;
use rxshop_core::{CustomerId, Product, ProductId};
use serde::Deserialize;

use super::BackendError;
use crate::models::CurrentCustomer;

/// A page of documents from a collection listing.
#[derive(Debug, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// A product document as stored in the collection.
#[derive(Debug, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

impl TryFrom<ProductDocument> for Product {
    type Error = BackendError;

    fn try_from(doc: ProductDocument) -> Result<Self, Self::Error> {
        let id = ProductId::parse(&doc.id)
            .map_err(|e| BackendError::InvalidDocument(format!("product {:?}: {e}", doc.id)))?;
        if doc.price.is_sign_negative() {
            return Err(BackendError::InvalidDocument(format!(
                "product {id}: negative price"
            )));
        }

        Ok(Self {
            id,
            name: doc.name,
            category: doc.category,
            price: doc.price,
            image: doc.image.filter(|url| !url.is_empty()),
        })
    }
}

/// The account behind a session.
#[derive(Debug, Deserialize)]
pub struct AccountDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<AccountDocument> for CurrentCustomer {
    fn from(account: AccountDocument) -> Self {
        Self {
            id: CustomerId::new(account.id),
            email: account.email,
            name: account.name.filter(|name| !name.is_empty()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_document_conversion() {
        let doc: ProductDocument = serde_json::from_str(
            r#"{"$id":"cetirizine-10","name":"Cetirizine 10mg","category":"Allergy","price":8.49,"image":"","$createdAt":"2024-01-01"}"#,
        )
        .unwrap();
        let product = Product::try_from(doc).unwrap();

        assert_eq!(product.id.as_str(), "cetirizine-10");
        assert_eq!(product.price, Decimal::new(849, 2));
        assert_eq!(product.image, None);
    }

    #[test]
    fn test_product_document_rejects_negative_price() {
        let doc: ProductDocument =
            serde_json::from_str(r#"{"$id":"x","name":"X","category":"Y","price":-1}"#).unwrap();
        assert!(matches!(
            Product::try_from(doc),
            Err(BackendError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_account_document_conversion() {
        let doc: AccountDocument =
            serde_json::from_str(r#"{"$id":"u1","email":"pat@example.org","name":""}"#).unwrap();
        let customer = CurrentCustomer::from(doc);

        assert_eq!(customer.id.as_str(), "u1");
        assert_eq!(customer.name, None);
    }
}
