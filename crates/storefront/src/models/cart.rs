//! Cart snapshot and the rules applied to it.
//!
//! A [`CartSnapshot`] is the denormalized view of one user's cart that the
//! cache holds. Mutation handlers consult it to decide what to write
//! ([`CartSnapshot::plan_add`]) and to reject operations on items that do
//! not exist, then invalidate it after the write.

use serde::Serialize;

use maison_core::{CartItemId, CartItemStatus, Price, ProductId, UserId, VariantSelector};

/// Maximum quantity of a single cart line.
pub const MAX_LINE_QUANTITY: i32 = 10;

/// Violations of the cart quantity rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartRuleError {
    #[error("quantity must be between 1 and {max}")]
    InvalidQuantity { max: i32 },
    #[error("cart already holds {current} of this item; at most {max} allowed")]
    ExceedsMaximum { current: i32, max: i32 },
}

/// One line of a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_slug: String,
    pub product_name: String,
    #[serde(flatten)]
    pub variant: VariantSelector,
    pub quantity: i32,
    pub status: CartItemStatus,
    pub unit_price: Price,
    pub line_total: Price,
    pub is_available: bool,
}

/// Snapshot of one user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    /// Subtotal of active lines only; inactive lines are saved for later.
    pub active_subtotal: Price,
    pub active_count: i32,
}

/// What `cart.add` should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPlan {
    /// No line for this (product, variant) yet.
    Insert { quantity: i32 },
    /// A line exists; raise its quantity.
    Increment { item_id: CartItemId, quantity: i32 },
}

/// Validate a requested line quantity.
///
/// # Errors
///
/// Returns `CartRuleError::InvalidQuantity` outside `1..=MAX_LINE_QUANTITY`.
pub const fn validate_quantity(quantity: i32) -> Result<(), CartRuleError> {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(CartRuleError::InvalidQuantity {
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

impl CartSnapshot {
    /// Build a snapshot and compute its active totals.
    #[must_use]
    pub fn new(user_id: UserId, items: Vec<CartItem>) -> Self {
        let (active_subtotal, active_count) = items
            .iter()
            .filter(|item| item.status == CartItemStatus::Active)
            .fold((Price::ZERO, 0), |(total, count), item| {
                (total.plus(item.line_total), count + item.quantity)
            });
        Self {
            user_id,
            items,
            active_subtotal,
            active_count,
        }
    }

    #[must_use]
    pub fn find(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// The line holding `(product_id, variant)`, if any.
    #[must_use]
    pub fn find_line(&self, product_id: ProductId, variant: &VariantSelector) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product_id == product_id && item.variant == *variant)
    }

    /// Lines that take part in checkout.
    pub fn active_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items
            .iter()
            .filter(|item| item.status == CartItemStatus::Active)
    }

    /// Decide between inserting a new line and incrementing an existing one.
    ///
    /// Adding the same (product, variant) twice raises the quantity of the
    /// existing line instead of creating a second one.
    ///
    /// # Errors
    ///
    /// Returns `CartRuleError` if `quantity` is invalid or the resulting
    /// line would exceed [`MAX_LINE_QUANTITY`].
    pub fn plan_add(
        &self,
        product_id: ProductId,
        variant: &VariantSelector,
        quantity: i32,
    ) -> Result<AddPlan, CartRuleError> {
        validate_quantity(quantity)?;
        match self.find_line(product_id, variant) {
            Some(existing) => {
                let total = existing.quantity + quantity;
                if total > MAX_LINE_QUANTITY {
                    return Err(CartRuleError::ExceedsMaximum {
                        current: existing.quantity,
                        max: MAX_LINE_QUANTITY,
                    });
                }
                Ok(AddPlan::Increment {
                    item_id: existing.id,
                    quantity: total,
                })
            }
            None => Ok(AddPlan::Insert { quantity }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(id: i32, product: i32, size: &str, quantity: i32) -> CartItem {
        let unit_price = Price::parse("100").unwrap();
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(product),
            product_slug: format!("product-{product}"),
            product_name: format!("Product {product}"),
            variant: VariantSelector::new(size, "black").unwrap(),
            quantity,
            status: CartItemStatus::Active,
            unit_price,
            line_total: unit_price.times(quantity),
            is_available: true,
        }
    }

    #[test]
    fn test_add_same_variant_increments() {
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 2)]);
        let variant = VariantSelector::new("m", "Black").unwrap();
        assert_eq!(
            cart.plan_add(ProductId::new(3), &variant, 1),
            Ok(AddPlan::Increment {
                item_id: CartItemId::new(7),
                quantity: 3
            })
        );
    }

    #[test]
    fn test_add_other_variant_inserts() {
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 2)]);
        let variant = VariantSelector::new("L", "black").unwrap();
        assert_eq!(
            cart.plan_add(ProductId::new(3), &variant, 2),
            Ok(AddPlan::Insert { quantity: 2 })
        );
    }

    #[test]
    fn test_add_rejects_overflow_and_bad_quantity() {
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 9)]);
        let variant = VariantSelector::new("M", "black").unwrap();
        assert_eq!(
            cart.plan_add(ProductId::new(3), &variant, 2),
            Err(CartRuleError::ExceedsMaximum { current: 9, max: 10 })
        );
        assert_eq!(
            cart.plan_add(ProductId::new(4), &variant, 0),
            Err(CartRuleError::InvalidQuantity { max: 10 })
        );
    }

    #[test]
    fn test_totals_ignore_inactive_lines() {
        let mut saved = item(8, 4, "S", 1);
        saved.status = CartItemStatus::Inactive;
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 2), saved]);
        assert_eq!(cart.active_subtotal.to_string(), "200.00");
        assert_eq!(cart.active_count, 2);
        assert_eq!(cart.active_items().count(), 1);
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10).is_ok());
        assert!(validate_quantity(11).is_err());
        assert!(validate_quantity(-1).is_err());
    }
}
