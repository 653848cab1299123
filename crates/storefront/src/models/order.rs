//! Orders, checkout totals and order-status rules.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use maison_core::coupon::{CouponRejection, CouponRules};
use maison_core::{FulfillmentStatus, OrderId, PaymentStatus, Price, ProductId};

use super::address::Address;
use super::cart::CartItem;

/// Reasons a checkout cannot proceed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart has no active items")]
    EmptyCart,
    #[error("'{0}' is no longer available")]
    Unavailable(String),
    #[error(transparent)]
    Coupon(#[from] CouponRejection),
}

/// Violations of order status transitions.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRuleError {
    #[error("order payment is already {0:?}")]
    NotPending(PaymentStatus),
}

/// An order with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: String,
    pub shipping_address: AddressSnapshot,
    pub subtotal: Price,
    pub discount: Price,
    pub total: Price,
    pub coupon_code: Option<String>,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line of an order, with the product name and price at purchase time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Shipping address copied onto the order at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub recipient_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
}

impl From<&Address> for AddressSnapshot {
    fn from(address: &Address) -> Self {
        Self {
            recipient_name: address.recipient_name.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Amounts computed at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Price,
    pub discount: Price,
    pub total: Price,
}

/// Compute checkout totals over the active cart lines.
///
/// # Errors
///
/// Returns `CheckoutError` if there are no lines, a product is unavailable,
/// or the coupon cannot be applied.
pub fn plan_checkout<'a>(
    items: impl IntoIterator<Item = &'a CartItem>,
    coupon: Option<&CouponRules>,
    now: DateTime<Utc>,
) -> Result<CheckoutTotals, CheckoutError> {
    let mut subtotal = Price::ZERO;
    let mut count = 0_usize;
    for item in items {
        if !item.is_available {
            return Err(CheckoutError::Unavailable(item.product_name.clone()));
        }
        subtotal = subtotal.plus(item.unit_price.times(item.quantity));
        count += 1;
    }
    if count == 0 {
        return Err(CheckoutError::EmptyCart);
    }

    let discount = match coupon {
        Some(rules) => {
            rules.check_applicable(now, subtotal)?;
            rules.discount_for(subtotal)
        }
        None => Price::ZERO,
    };

    Ok(CheckoutTotals {
        subtotal,
        discount,
        total: subtotal.saturating_minus(discount),
    })
}

/// Payment may only be confirmed or cancelled while it is pending.
///
/// # Errors
///
/// Returns `OrderRuleError::NotPending` otherwise.
pub const fn ensure_pending(status: PaymentStatus) -> Result<(), OrderRuleError> {
    match status {
        PaymentStatus::Pending => Ok(()),
        other => Err(OrderRuleError::NotPending(other)),
    }
}

const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a human-friendly order reference such as `MS-20261018-7KQ2XM4D`.
#[must_use]
pub fn generate_reference(now: DateTime<Utc>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..8)
        .filter_map(|_| REFERENCE_ALPHABET.choose(&mut rng).map(|b| char::from(*b)))
        .collect();
    format!("MS-{}-{suffix}", now.format("%Y%m%d"))
}
