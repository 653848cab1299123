//! Wishlist snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use maison_core::{Price, ProductId, UserId, WishlistItemId};

/// One wishlisted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product_slug: String,
    pub product_name: String,
    pub price: Price,
    pub is_available: bool,
    pub added_at: DateTime<Utc>,
}

/// Snapshot of one user's wishlist, as cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistSnapshot {
    pub user_id: UserId,
    pub items: Vec<WishlistItem>,
}

impl WishlistSnapshot {
    #[must_use]
    pub const fn new(user_id: UserId, items: Vec<WishlistItem>) -> Self {
        Self { user_id, items }
    }

    #[must_use]
    pub fn find(&self, item_id: WishlistItemId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    #[must_use]
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let wishlist = WishlistSnapshot::new(
            UserId::new(1),
            vec![WishlistItem {
                id: WishlistItemId::new(5),
                product_id: ProductId::new(9),
                product_slug: "linen-shirt".to_string(),
                product_name: "Linen Shirt".to_string(),
                price: Price::ZERO,
                is_available: true,
                added_at: Utc::now(),
            }],
        );
        assert!(wishlist.contains_product(ProductId::new(9)));
        assert!(!wishlist.contains_product(ProductId::new(10)));
        assert!(wishlist.find(WishlistItemId::new(5)).is_some());
        assert!(wishlist.find(WishlistItemId::new(6)).is_none());
    }
}
