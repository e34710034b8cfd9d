//! Cookie-backed cart.
//!
//! The cart lives entirely in the browser: a percent-encoded JSON array of
//! `{id, quantity}` in an HTTP-only cookie. The server decodes it, applies
//! one mutation, and writes the whole array back. Product data is joined in
//! on read.
//!
//! There is no server-side copy and no versioning, so two tabs writing at
//! the same time race and the last response to land wins.

pub mod cookie;
pub mod hydrate;

pub use cookie::{CART_COOKIE_NAME, CartCookieError, StoredCart, cart_cookie, removal_cookie};
pub use hydrate::hydrate;
