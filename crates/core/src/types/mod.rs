//! Core types for RxShop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod currency;
pub mod id;
pub mod order;
pub mod product;
pub mod quantity;

pub use cart::{Cart, CartError, CartLine, HydratedCartLine};
pub use currency::{CurrencyCode, UnknownCurrency};
pub use id::*;
pub use order::{OrderSummary, ShippingPolicy};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
