//! Simulated checkout.
//!
//! Prices the cart, returns an order confirmation and empties the cart.
//! No payment gateway is involved.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use rxshop_core::OrderSummary;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::{StoredCart, hydrate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::cart::forget;

/// Checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: OrderSummary,
}

/// Generate a customer-facing order number, e.g. `RX-3F9A01BC`.
fn order_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("RX-{}", id.get(..8).unwrap_or(&id))
}

/// Place an order for the current cart (`POST /api/checkout`).
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    StoredCart(cart): StoredCart,
) -> Result<impl IntoResponse> {
    let cart = cart
        .filter(|cart| !cart.is_empty())
        .ok_or_else(|| AppError::BadRequest("Cart is empty".to_string()))?;

    let items = hydrate(state.products(), &cart).await?;
    if items.is_empty() {
        return Err(AppError::BadRequest(
            "None of the products in the cart are available".to_string(),
        ));
    }

    let checkout = &state.config().checkout;
    let order = OrderSummary::price(
        order_number(),
        customer.id,
        items,
        &checkout.shipping,
        checkout.currency,
        Utc::now(),
    );

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", order.order_number.as_str())]),
    );
    tracing::info!(
        order_number = %order.order_number,
        item_count = order.item_count,
        total = %order.total,
        "Order placed"
    );

    Ok((
        forget(state.config().secure_cookies()),
        Json(CheckoutResponse {
            success: true,
            order,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        let number = order_number();
        let suffix = number.strip_prefix("RX-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }
}
