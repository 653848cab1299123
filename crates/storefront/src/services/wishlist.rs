//! Wishlist operations, cached per user like the cart.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use maison_core::{ProductId, UserId, VariantSelector, WishlistItemId};

use crate::cache::ShopCache;
use crate::db::{ProductRepository, RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::models::cart::CartRuleError;
use crate::models::{CartSnapshot, WishlistSnapshot, cart::validate_quantity};
use crate::services::cart::{CartService, resolve_variant};

/// Body of `POST /api/wishlist/move-to-cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveToCart {
    pub user_id: UserId,
    pub item_id: WishlistItemId,
    pub size: String,
    pub color: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

const fn one() -> i32 {
    1
}

/// Check that moving `quantity` of `(product_id, variant)` into `cart`
/// keeps the line within the cart limits.
///
/// # Errors
///
/// Returns `CartRuleError::ExceedsMaximum` when an existing line would go
/// past the maximum, as `cart.add` does.
pub(crate) fn ensure_cart_room(
    cart: &CartSnapshot,
    product_id: ProductId,
    variant: &VariantSelector,
    quantity: i32,
) -> std::result::Result<(), CartRuleError> {
    cart.plan_add(product_id, variant, quantity).map(|_| ())
}

pub struct WishlistService<'a> {
    pool: &'a PgPool,
    cache: &'a ShopCache,
    wishlists: WishlistRepository<'a>,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ShopCache) -> Self {
        Self {
            pool,
            cache,
            wishlists: WishlistRepository::new(pool),
        }
    }

    /// The user's wishlist, from cache when present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if loading fails.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, user_id: UserId) -> Result<Arc<WishlistSnapshot>> {
        if let Some(hit) = self.cache.wishlist(user_id).await {
            return Ok(hit);
        }
        let snapshot = Arc::new(self.wishlists.load(user_id).await?);
        self.cache.put_wishlist(Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    async fn refreshed(&self, user_id: UserId) -> Result<Arc<WishlistSnapshot>> {
        self.cache.invalidate_wishlist(user_id).await;
        self.snapshot(user_id).await
    }

    /// Wishlist a product.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown product; `CONFLICT` if already present.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<Arc<WishlistSnapshot>> {
        ProductRepository::new(self.pool)
            .availability(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;

        if self.snapshot(user_id).await?.contains_product(product_id) {
            return Err(AppError::Conflict("product already in wishlist".to_string()));
        }
        self.wishlists.add(user_id, product_id).await?;
        self.refreshed(user_id).await
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if the entry does not exist.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
    ) -> Result<Arc<WishlistSnapshot>> {
        if self.snapshot(user_id).await?.find(item_id).is_none() {
            return Err(AppError::NotFound(format!("wishlist item {item_id} not found")));
        }
        self.wishlists.remove(user_id, item_id).await?;
        self.refreshed(user_id).await
    }

    /// Move a wishlisted product into the cart for the chosen variant.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown entry; `BAD_REQUEST` for an unavailable
    /// product, unknown variant, invalid quantity or a cart line that would
    /// pass the maximum.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, item_id = %input.item_id))]
    pub async fn move_to_cart(
        &self,
        input: &MoveToCart,
    ) -> Result<(Arc<CartSnapshot>, Arc<WishlistSnapshot>)> {
        validate_quantity(input.quantity)?;
        let snapshot = self.snapshot(input.user_id).await?;
        let entry = snapshot.find(input.item_id).ok_or_else(|| {
            AppError::NotFound(format!("wishlist item {} not found", input.item_id))
        })?;
        let variant = resolve_variant(self.pool, entry.product_id, &input.size, &input.color).await?;
        let carts = CartService::new(self.pool, self.cache);
        let cart = carts.snapshot(input.user_id).await?;
        ensure_cart_room(
            &cart,
            entry.product_id,
            &variant,
            input.quantity,
        )?;

        match self
            .wishlists
            .move_to_cart(
                input.user_id,
                input.item_id,
                entry.product_id,
                &variant,
                input.quantity,
            )
            .await
        {
            Ok(_) => {}
            Err(RepositoryError::NotFound) => {
                self.cache.invalidate_wishlist(input.user_id).await;
                return Err(AppError::NotFound(format!(
                    "wishlist item {} not found",
                    input.item_id
                )));
            }
            Err(err @ RepositoryError::Conflict(_)) => {
                // The cart changed since the snapshot was cached.
                self.cache.invalidate_cart(input.user_id).await;
                return Err(err.into());
            }
            Err(other) => return Err(other.into()),
        }

        self.cache.invalidate_cart(input.user_id).await;
        let wishlist = self.refreshed(input.user_id).await?;
        let cart = carts.snapshot(input.user_id).await?;
        Ok((cart, wishlist))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::MAX_LINE_QUANTITY;
    use crate::models::cart::tests::item;

    #[test]
    fn test_move_to_cart_rejects_overfull_line() {
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 9)]);
        let variant = VariantSelector::new("M", "black").unwrap();
        assert_eq!(
            ensure_cart_room(&cart, ProductId::new(3), &variant, 5),
            Err(CartRuleError::ExceedsMaximum {
                current: 9,
                max: MAX_LINE_QUANTITY
            })
        );
        assert!(ensure_cart_room(&cart, ProductId::new(3), &variant, 1).is_ok());
    }

    #[test]
    fn test_move_to_cart_allows_new_line() {
        let cart = CartSnapshot::new(UserId::new(1), vec![item(7, 3, "M", 9)]);
        let other_size = VariantSelector::new("L", "black").unwrap();
        assert!(ensure_cart_room(&cart, ProductId::new(3), &other_size, 5).is_ok());
        assert!(ensure_cart_room(&cart, ProductId::new(4), &other_size, 10).is_ok());
    }
}
