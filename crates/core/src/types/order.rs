//! Simulated order pricing.
//!
//! Checkout never talks to a payment gateway. It prices the hydrated cart,
//! applies a flat shipping policy and hands back a confirmation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{CurrencyCode, CustomerId, HydratedCartLine};

/// Flat-rate shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Fee charged when the subtotal is below the threshold.
    pub flat_fee: Decimal,
    /// Subtotal at or above which shipping is free.
    pub free_threshold: Decimal,
}

impl ShippingPolicy {
    /// Shipping charged for a given subtotal.
    #[must_use]
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal.is_zero() || subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }
}

/// Priced order confirmation returned by checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_number: String,
    pub customer_id: CustomerId,
    pub items: Vec<HydratedCartLine>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
    pub placed_at: DateTime<Utc>,
}

impl OrderSummary {
    /// Price `items` under `policy`.
    #[must_use]
    pub fn price(
        order_number: String,
        customer_id: CustomerId,
        items: Vec<HydratedCartLine>,
        policy: &ShippingPolicy,
        currency: CurrencyCode,
        placed_at: DateTime<Utc>,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(HydratedCartLine::line_total).sum();
        let item_count = items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum();
        let shipping = policy.fee_for(subtotal);

        Self {
            order_number,
            customer_id,
            items,
            item_count,
            subtotal,
            shipping,
            total: subtotal + shipping,
            currency,
            placed_at,
        }
    }
}
