//! RxShop Core - Shared domain types.
//!
//! This crate provides the types used by the storefront service:
//! product ids and quantities, catalog products, the cart and its merge
//! rules, and simulated order pricing.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no cookies. This keeps the cart rules testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, quantities, currencies, products, carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
