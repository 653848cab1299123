//! Cart operations.
//!
//! Reads go through the per-user snapshot cache. Every mutation validates
//! against the snapshot, writes to Postgres, then invalidates the user's
//! cart entry so the next read reloads it.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};

use maison_core::{CartItemId, CartItemStatus, ProductId, UserId, VariantSelector};

use crate::cache::ShopCache;
use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{AddPlan, CartSnapshot, WishlistSnapshot, cart::validate_quantity};
use crate::services::wishlist::WishlistService;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCart {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

/// Resolve the product and variant a cart or wishlist mutation refers to.
///
/// # Errors
///
/// `NOT_FOUND` for an unknown product; `BAD_REQUEST` for an unavailable
/// product or a variant the product does not offer.
pub(crate) async fn resolve_variant(
    pool: &PgPool,
    product_id: ProductId,
    size: &str,
    color: &str,
) -> Result<VariantSelector> {
    let products = ProductRepository::new(pool);
    let product = products
        .availability(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} not found")))?;
    if !product.is_available {
        return Err(AppError::BadRequest(format!(
            "'{}' is not available",
            product.name
        )));
    }

    let variant =
        VariantSelector::new(size, color).map_err(|e| AppError::BadRequest(e.to_string()))?;
    if !products.has_variant(product_id, &variant).await? {
        return Err(AppError::BadRequest(format!(
            "'{}' does not come in {variant}",
            product.name
        )));
    }
    Ok(variant)
}

pub struct CartService<'a> {
    pool: &'a PgPool,
    cache: &'a ShopCache,
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ShopCache) -> Self {
        Self {
            pool,
            cache,
            carts: CartRepository::new(pool),
        }
    }

    /// The user's cart, from cache when present.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if loading fails.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, user_id: UserId) -> Result<Arc<CartSnapshot>> {
        if let Some(hit) = self.cache.cart(user_id).await {
            return Ok(hit);
        }
        let snapshot = Arc::new(self.carts.load(user_id).await?);
        self.cache.put_cart(Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    async fn refreshed(&self, user_id: UserId) -> Result<Arc<CartSnapshot>> {
        self.cache.invalidate_cart(user_id).await;
        self.snapshot(user_id).await
    }

    async fn existing_line(&self, user_id: UserId, item_id: CartItemId) -> Result<()> {
        let snapshot = self.snapshot(user_id).await?;
        if snapshot.find(item_id).is_none() {
            return Err(AppError::NotFound(format!("cart item {item_id} not found")));
        }
        Ok(())
    }

    /// Add a product variant. Re-adding the same (product, size, color)
    /// raises the existing line's quantity.
    ///
    /// # Errors
    ///
    /// See [`resolve_variant`]; `BAD_REQUEST` for an invalid quantity.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, product_id = %input.product_id))]
    pub async fn add(&self, input: &AddToCart) -> Result<Arc<CartSnapshot>> {
        validate_quantity(input.quantity)?;
        let variant = resolve_variant(self.pool, input.product_id, &input.size, &input.color).await?;

        let snapshot = self.snapshot(input.user_id).await?;
        match snapshot.plan_add(input.product_id, &variant, input.quantity)? {
            AddPlan::Increment { item_id, quantity } => {
                let updated = self
                    .carts
                    .increment_line(input.user_id, item_id, quantity)
                    .await?;
                if !updated {
                    // Cached line was stale; fall back to the upsert.
                    self.carts
                        .upsert(input.user_id, input.product_id, &variant, input.quantity)
                        .await?;
                }
            }
            AddPlan::Insert { quantity } => {
                self.carts
                    .upsert(input.user_id, input.product_id, &variant, quantity)
                    .await?;
            }
        }

        info!(size = %variant.size, color = %variant.color, "Added to cart");
        self.refreshed(input.user_id).await
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` outside `1..=10`; `NOT_FOUND` for an unknown line.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<Arc<CartSnapshot>> {
        validate_quantity(quantity)?;
        self.existing_line(user_id, item_id).await?;
        if !self.carts.set_quantity(user_id, item_id, quantity).await? {
            self.cache.invalidate_cart(user_id).await;
            return Err(AppError::NotFound(format!("cart item {item_id} not found")));
        }
        self.refreshed(user_id).await
    }

    /// Toggle a line between active and saved-for-later.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown line.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        status: CartItemStatus,
    ) -> Result<Arc<CartSnapshot>> {
        self.existing_line(user_id, item_id).await?;
        self.carts.set_status(user_id, item_id, status).await?;
        self.refreshed(user_id).await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown line.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<Arc<CartSnapshot>> {
        self.existing_line(user_id, item_id).await?;
        self.carts.delete(user_id, item_id).await?;
        self.refreshed(user_id).await
    }

    /// Remove several lines. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for an empty id list.
    #[instrument(skip(self, item_ids))]
    pub async fn remove_many(
        &self,
        user_id: UserId,
        item_ids: &[CartItemId],
    ) -> Result<Arc<CartSnapshot>> {
        if item_ids.is_empty() {
            return Err(AppError::BadRequest("item_ids cannot be empty".to_string()));
        }
        let removed = self.carts.delete_many(user_id, item_ids).await?;
        info!(removed, "Removed cart lines");
        self.refreshed(user_id).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Arc<CartSnapshot>> {
        self.carts.clear(user_id).await?;
        self.refreshed(user_id).await
    }

    /// Move a line to the wishlist atomically.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown line; `CONFLICT` if the product is
    /// already wishlisted.
    #[instrument(skip(self))]
    pub async fn move_to_wishlist(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<(Arc<CartSnapshot>, Arc<WishlistSnapshot>)> {
        let snapshot = self.snapshot(user_id).await?;
        let line = snapshot
            .find(item_id)
            .ok_or_else(|| AppError::NotFound(format!("cart item {item_id} not found")))?;

        let wishlists = WishlistService::new(self.pool, self.cache);
        if wishlists.snapshot(user_id).await?.contains_product(line.product_id) {
            return Err(AppError::Conflict("product already in wishlist".to_string()));
        }

        match self
            .carts
            .move_to_wishlist(user_id, item_id, line.product_id)
            .await
        {
            Ok(_) => {}
            Err(RepositoryError::NotFound) => {
                self.cache.invalidate_cart(user_id).await;
                return Err(AppError::NotFound(format!("cart item {item_id} not found")));
            }
            Err(other) => return Err(other.into()),
        }

        self.cache.invalidate_wishlist(user_id).await;
        let cart = self.refreshed(user_id).await?;
        let wishlist = wishlists.snapshot(user_id).await?;
        Ok((cart, wishlist))
    }
}
