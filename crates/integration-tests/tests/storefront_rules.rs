//! Cart, wishlist, address and checkout rules, exercised through the
//! storefront's public model API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Duration;
use rust_decimal::Decimal;

use maison_core::coupon::{CouponRejection, CouponRules};
use maison_core::{
    CartItemStatus, DiscountKind, PaymentStatus, Price, ProductId, VariantSelector,
    WishlistItemId,
};
use maison_integration_tests::{address, address_input, cart_item, fixed_now, price, user};
use maison_storefront::models::address::{check_delete, plan_create, plan_set_primary, plan_update};
use maison_storefront::models::order::{ensure_pending, generate_reference, plan_checkout};
use maison_storefront::models::{
    AddPlan, AddressRuleError, CartRuleError, CartSnapshot, CheckoutError, MAX_LINE_QUANTITY,
    WishlistItem, WishlistSnapshot,
};

fn percentage_coupon(pct: i64) -> CouponRules {
    CouponRules {
        kind: DiscountKind::Percentage,
        value: Decimal::from(pct),
        min_order_total: price("1000"),
        max_discount: Some(price("500")),
        usage_limit: Some(100),
        used_count: 3,
        starts_at: Some(fixed_now() - Duration::days(1)),
        expires_at: Some(fixed_now() + Duration::days(30)),
        is_active: true,
    }
}

// =============================================================================
// Cart
// =============================================================================

#[test]
fn test_same_variant_twice_increments_the_line() {
    let cart = CartSnapshot::new(user(), vec![cart_item(11, 5, "M", 2, "899.00")]);
    let variant = VariantSelector::new("m", "BLACK").unwrap();

    let plan = cart.plan_add(ProductId::new(5), &variant, 3).unwrap();

    assert_eq!(
        plan,
        AddPlan::Increment {
            item_id: cart.items[0].id,
            quantity: 5
        }
    );
}

#[test]
fn test_other_variant_inserts_a_new_line() {
    let cart = CartSnapshot::new(user(), vec![cart_item(11, 5, "M", 2, "899.00")]);
    let variant = VariantSelector::new("L", "black").unwrap();

    let plan = cart.plan_add(ProductId::new(5), &variant, 1).unwrap();

    assert_eq!(plan, AddPlan::Insert { quantity: 1 });
}

#[test]
fn test_line_quantity_is_capped() {
    let cart = CartSnapshot::new(user(), vec![cart_item(11, 5, "M", 8, "899.00")]);
    let variant = VariantSelector::new("M", "black").unwrap();

    let err = cart.plan_add(ProductId::new(5), &variant, 3).unwrap_err();
    assert_eq!(
        err,
        CartRuleError::ExceedsMaximum {
            current: 8,
            max: MAX_LINE_QUANTITY
        }
    );
    assert!(cart.plan_add(ProductId::new(6), &variant, 0).is_err());
}

#[test]
fn test_saved_for_later_lines_are_not_in_totals() {
    let mut saved = cart_item(12, 6, "S", 1, "1500.00");
    saved.status = CartItemStatus::Inactive;
    let cart = CartSnapshot::new(user(), vec![cart_item(11, 5, "M", 2, "899.00"), saved]);

    assert_eq!(cart.active_subtotal, price("1798.00"));
    assert_eq!(cart.active_count, 2);
    assert_eq!(cart.active_items().count(), 1);
}

// =============================================================================
// Wishlist
// =============================================================================

#[test]
fn test_wishlist_membership() {
    let wishlist = WishlistSnapshot::new(
        user(),
        vec![WishlistItem {
            id: WishlistItemId::new(3),
            product_id: ProductId::new(9),
            product_slug: "silk-scarf".to_string(),
            product_name: "Silk Scarf".to_string(),
            price: price("1299.00"),
            is_available: true,
            added_at: fixed_now(),
        }],
    );

    assert!(wishlist.contains_product(ProductId::new(9)));
    assert!(!wishlist.contains_product(ProductId::new(10)));
    assert!(wishlist.find(WishlistItemId::new(3)).is_some());
    assert!(wishlist.find(WishlistItemId::new(4)).is_none());
}

// =============================================================================
// Addresses
// =============================================================================

#[test]
fn test_first_address_is_primary() {
    let write = plan_create(&[], &address_input("Home", Some(false))).unwrap();
    assert!(write.is_primary);
    assert_eq!(write.demote, None);
}

#[test]
fn test_new_primary_demotes_the_old_one() {
    let existing = vec![address(1, "Home", true)];
    let write = plan_create(&existing, &address_input("Parents", Some(true))).unwrap();

    assert!(write.is_primary);
    assert_eq!(write.demote, Some(existing[0].id));
}

#[test]
fn test_duplicate_alias_is_a_conflict() {
    let existing = vec![address(1, "Home", true)];
    let err = plan_create(&existing, &address_input("  home ", None)).unwrap_err();
    assert!(matches!(err, AddressRuleError::DuplicateSlug(_)));
}

#[test]
fn test_primary_cannot_be_unset_directly() {
    let existing = vec![address(1, "Home", true), address(2, "Office", false)];
    let err = plan_update(&existing, existing[0].id, &address_input("Home", Some(false)))
        .unwrap_err();
    assert_eq!(err, AddressRuleError::CannotUnsetPrimary);
}

#[test]
fn test_set_primary_swaps() {
    let existing = vec![address(1, "Home", true), address(2, "Office", false)];
    assert_eq!(
        plan_set_primary(&existing, existing[1].id).unwrap(),
        Some(existing[0].id)
    );
    assert_eq!(plan_set_primary(&existing, existing[0].id).unwrap(), None);
}

#[test]
fn test_delete_rules() {
    let only = vec![address(1, "Home", true)];
    assert_eq!(
        check_delete(&only, only[0].id).unwrap_err(),
        AddressRuleError::LastAddress
    );

    let two = vec![address(1, "Home", true), address(2, "Office", false)];
    assert_eq!(
        check_delete(&two, two[0].id).unwrap_err(),
        AddressRuleError::PrimaryAddress
    );
    assert!(check_delete(&two, two[1].id).is_ok());
}

// =============================================================================
// Checkout
// =============================================================================

#[test]
fn test_checkout_applies_capped_percentage() {
    let items = vec![
        cart_item(1, 5, "M", 2, "2000.00"),
        cart_item(2, 6, "L", 1, "1500.00"),
    ];
    let coupon = percentage_coupon(20);

    let totals = plan_checkout(&items, Some(&coupon), fixed_now()).unwrap();

    assert_eq!(totals.subtotal, price("5500.00"));
    // 20% would be 1100, capped at 500.
    assert_eq!(totals.discount, price("500.00"));
    assert_eq!(totals.total, price("5000.00"));
}

#[test]
fn test_checkout_without_coupon() {
    let items = vec![cart_item(1, 5, "M", 1, "499.50")];
    let totals = plan_checkout(&items, None, fixed_now()).unwrap();
    assert_eq!(totals.discount, Price::ZERO);
    assert_eq!(totals.total, price("499.50"));
}

#[test]
fn test_checkout_rejections() {
    assert_eq!(
        plan_checkout(&[], None, fixed_now()).unwrap_err(),
        CheckoutError::EmptyCart
    );

    let mut gone = cart_item(1, 5, "M", 1, "499.00");
    gone.is_available = false;
    assert!(matches!(
        plan_checkout(&[gone], None, fixed_now()).unwrap_err(),
        CheckoutError::Unavailable(_)
    ));

    let small = vec![cart_item(1, 5, "M", 1, "499.00")];
    assert_eq!(
        plan_checkout(&small, Some(&percentage_coupon(10)), fixed_now()).unwrap_err(),
        CheckoutError::Coupon(CouponRejection::BelowMinimum(price("1000")))
    );

    let mut expired = percentage_coupon(10);
    expired.expires_at = Some(fixed_now());
    let items = vec![cart_item(1, 5, "M", 3, "499.00")];
    assert_eq!(
        plan_checkout(&items, Some(&expired), fixed_now()).unwrap_err(),
        CheckoutError::Coupon(CouponRejection::Expired)
    );
}

#[test]
fn test_only_pending_orders_change_payment() {
    assert!(ensure_pending(PaymentStatus::Pending).is_ok());
    assert!(ensure_pending(PaymentStatus::Paid).is_err());
    assert!(ensure_pending(PaymentStatus::Cancelled).is_err());
}

#[test]
fn test_order_reference_shape() {
    let reference = generate_reference(fixed_now());
    assert!(reference.starts_with("MS-20261018-"));
    assert_eq!(reference.len(), "MS-20261018-".len() + 8);
}
