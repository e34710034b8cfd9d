//! Cart lines and the rules for merging them.
//!
//! The cart is a small ordered list of `{id, quantity}` pairs. It carries no
//! product data; display fields are joined in at read time
//! (see [`HydratedCartLine`]).
//!
//! # Invariants
//!
//! - at most one line per [`ProductId`]
//! - every line has a quantity of at least 1 (a [`Quantity`] cannot be zero)
//! - at most [`Cart::MAX_LINES`] lines
//! - lines keep insertion order

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, ProductId, Quantity, QuantityError};

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
    /// The line's quantity would exceed the per-line cap.
    #[error("invalid quantity for product {id}: {source}")]
    Quantity {
        id: ProductId,
        #[source]
        source: QuantityError,
    },
    /// Adding another distinct product would exceed the line cap.
    #[error("cart cannot hold more than {max} different products")]
    TooManyLines { max: usize },
}

/// One product/quantity pair in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(id: ProductId, quantity: Quantity) -> Self {
        Self { id, quantity }
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Maximum number of distinct products in one cart.
    pub const MAX_LINES: usize = 32;

    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from untrusted lines, restoring the invariants.
    ///
    /// Duplicate ids are merged (quantities summed, capped at
    /// [`Quantity::MAX`]) and lines past [`Cart::MAX_LINES`] are dropped.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            match cart.position(&line.id) {
                Some(pos) => {
                    if let Some(existing) = cart.lines.get_mut(pos) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None if cart.lines.len() < Self::MAX_LINES => cart.lines.push(line),
                None => {}
            }
        }
        cart
    }

    /// Add `quantity` of a product.
    ///
    /// Increments the existing line for `id`, or appends a new one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Quantity`] if the merged quantity would exceed
    /// [`Quantity::MAX`], or [`CartError::TooManyLines`] if a new line would
    /// exceed [`Cart::MAX_LINES`]. The cart is unchanged on error.
    pub fn add(&mut self, id: ProductId, quantity: Quantity) -> Result<(), CartError> {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .map_err(|source| CartError::Quantity {
                    id: id.clone(),
                    source,
                })?;
            return Ok(());
        }

        if self.lines.len() >= Self::MAX_LINES {
            return Err(CartError::TooManyLines {
                max: Self::MAX_LINES,
            });
        }
        self.lines.push(CartLine::new(id, quantity));
        Ok(())
    }

    /// Overwrite the quantity of an existing line, or remove it when
    /// `quantity` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if there is no line for `id`.
    pub fn set_quantity(
        &mut self,
        id: &ProductId,
        quantity: Option<Quantity>,
    ) -> Result<(), CartError> {
        let pos = self
            .position(id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;

        match quantity {
            Some(quantity) => {
                if let Some(line) = self.lines.get_mut(pos) {
                    line.quantity = quantity;
                }
            }
            None => {
                self.lines.remove(pos);
            }
        }
        Ok(())
    }

    /// Remove a line. Returns `true` if it was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        self.position(id).is_some_and(|pos| {
            self.lines.remove(pos);
            true
        })
    }

    /// Quantity held for `id`, if any.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> Option<Quantity> {
        self.lines
            .iter()
            .find(|line| &line.id == id)
            .map(|line| line.quantity)
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| &line.id == id)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<CartLine>::deserialize(deserializer).map(Self::from_lines)
    }
}

/// A cart line joined with its product for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedCartLine {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: Quantity,
}

impl HydratedCartLine {
    /// Join a product with the quantity held in the cart.
    #[must_use]
    pub fn new(product: Product, quantity: Quantity) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            price: product.price,
            image: product.image,
            quantity,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }
}
