//! Wishlist persistence.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use maison_core::{CartItemId, Price, ProductId, UserId, VariantSelector, WishlistItemId};

use super::RepositoryError;
use super::cart::upsert_in_tx;
use crate::models::{WishlistItem, WishlistSnapshot};

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistItemId,
    product_id: ProductId,
    product_slug: String,
    product_name: String,
    price: Price,
    is_available: bool,
    added_at: DateTime<Utc>,
}

impl From<WishlistRow> for WishlistItem {
    fn from(row: WishlistRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_slug: row.product_slug,
            product_name: row.product_name,
            price: row.price,
            is_available: row.is_available,
            added_at: row.added_at,
        }
    }
}

pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn load(&self, user_id: UserId) -> Result<WishlistSnapshot, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id, w.product_id, p.slug AS product_slug, p.name AS product_name,
                   p.price, p.is_available, w.created_at AS added_at
            FROM shop.wishlist_item w
            JOIN shop.product p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC, w.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(WishlistSnapshot::new(
            user_id,
            rows.into_iter().map(WishlistItem::from).collect(),
        ))
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if it is already wishlisted.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let (id,): (WishlistItemId,) = sqlx::query_as(
            r"
            INSERT INTO shop.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product already in wishlist"))?;
        Ok(id)
    }

    /// Remove a wishlist row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.wishlist_item WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Put a wishlisted product in the cart for `variant` and remove the
    /// wishlist row, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist row is gone.
    #[instrument(skip(self))]
    pub async fn move_to_cart(
        &self,
        user_id: UserId,
        item_id: WishlistItemId,
        product_id: ProductId,
        variant: &VariantSelector,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM shop.wishlist_item WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let cart_id = upsert_in_tx(&mut tx, user_id, product_id, variant, quantity).await?;

        tx.commit().await?;
        Ok(cart_id)
    }
}
