//! Integration tests for Maison.
//!
//! # Running Tests
//!
//! ```bash
//! # Library-level tests (no database needed)
//! cargo test -p maison-integration-tests
//!
//! # Live-server tests, against running storefront and admin binaries
//! cargo test -p maison-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_*` - cart, wishlist, address and checkout rules
//! - `admin_*` - CSV import, carrier polling, error bodies, live API
//!
//! This library holds the fixtures the test files share.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, TimeZone, Utc};

use maison_core::{
    AddressId, AddressType, CartItemId, CartItemStatus, Price, ProductId, UserId, VariantSelector,
};
use maison_storefront::models::{Address, AddressInput, CartItem};

/// Base URL of a running storefront (`STOREFRONT_TEST_URL`).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of a running admin (`ADMIN_TEST_URL`).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_TEST_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A fixed instant so time-dependent rules are deterministic.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

#[must_use]
pub fn price(s: &str) -> Price {
    Price::parse(s).unwrap()
}

/// An active, available cart line.
#[must_use]
pub fn cart_item(id: i32, product_id: i32, size: &str, quantity: i32, unit_price: &str) -> CartItem {
    let unit_price = price(unit_price);
    CartItem {
        id: CartItemId::new(id),
        product_id: ProductId::new(product_id),
        product_slug: format!("product-{product_id}"),
        product_name: format!("Product {product_id}"),
        variant: VariantSelector::new(size, "black").unwrap(),
        quantity,
        status: CartItemStatus::Active,
        unit_price,
        line_total: unit_price.times(quantity),
        is_available: true,
    }
}

/// A stored address with a slug derived the same way the rules derive it.
#[must_use]
pub fn address(id: i32, alias: &str, is_primary: bool) -> Address {
    Address {
        id: AddressId::new(id),
        alias: alias.to_string(),
        address_type: AddressType::Home,
        slug: maison_core::address::address_slug(alias, AddressType::Home).unwrap(),
        is_primary,
        recipient_name: "Asha Rao".to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "KA".to_string(),
        zip: "560001".to_string(),
        phone: "+91 98450 12345".to_string(),
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

/// A valid address body.
#[must_use]
pub fn address_input(alias: &str, is_primary: Option<bool>) -> AddressInput {
    AddressInput {
        alias: alias.to_string(),
        address_type: AddressType::Home,
        recipient_name: "Asha Rao".to_string(),
        street: "12 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "KA".to_string(),
        zip: "560001".to_string(),
        phone: "+91 98450 12345".to_string(),
        is_primary,
    }
}

#[must_use]
pub const fn user() -> UserId {
    UserId::new(1)
}
