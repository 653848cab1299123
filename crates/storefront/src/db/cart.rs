//! Cart line persistence.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use maison_core::{
    CartItemId, CartItemStatus, Price, ProductId, UserId, VariantSelector, WishlistItemId,
};

use super::RepositoryError;
use crate::models::{CartItem, CartSnapshot, MAX_LINE_QUANTITY};

/// Insert or add to a line. The update is skipped, so no row comes back,
/// when the sum would pass the line maximum (`$6`).
const UPSERT_LINE: &str = r"
    INSERT INTO shop.cart_item (user_id, product_id, size, color, quantity)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (user_id, product_id, size, color) DO UPDATE
    SET quantity = shop.cart_item.quantity + EXCLUDED.quantity,
        status = 'active',
        updated_at = NOW()
    WHERE shop.cart_item.quantity + EXCLUDED.quantity <= $6
    RETURNING id
";

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    product_id: ProductId,
    product_slug: String,
    product_name: String,
    size: String,
    color: String,
    quantity: i32,
    status: CartItemStatus,
    unit_price: Price,
    is_available: bool,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_slug: row.product_slug,
            product_name: row.product_name,
            // Stored values were normalized on insert.
            variant: VariantSelector {
                size: row.size,
                color: row.color,
            },
            quantity: row.quantity,
            status: row.status,
            unit_price: row.unit_price,
            line_total: row.unit_price.times(row.quantity),
            is_available: row.is_available,
        }
    }
}

/// Repository for `shop.cart_item`.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's full cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn load(&self, user_id: UserId) -> Result<CartSnapshot, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT c.id, c.product_id, p.slug AS product_slug, p.name AS product_name,
                   c.size, c.color, c.quantity, c.status,
                   p.price AS unit_price, p.is_available
            FROM shop.cart_item c
            JOIN shop.product p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(CartSnapshot::new(
            user_id,
            rows.into_iter().map(CartItem::from).collect(),
        ))
    }

    /// Insert a line, or add to the existing line for the same
    /// (product, size, color). A saved-for-later line becomes active again.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the combined quantity would
    /// pass the line maximum, `RepositoryError::Database` otherwise.
    #[instrument(skip(self))]
    pub async fn upsert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        variant: &VariantSelector,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let row: Option<(CartItemId,)> = sqlx::query_as(UPSERT_LINE)
            .bind(user_id)
            .bind(product_id)
            .bind(&variant.size)
            .bind(&variant.color)
            .bind(quantity)
            .bind(MAX_LINE_QUANTITY)
            .fetch_optional(self.pool)
            .await?;
        row.map(|(id,)| id).ok_or_else(line_full)
    }

    /// Raise an existing line to `quantity` on behalf of `cart.add`,
    /// reactivating it if it was saved for later. Returns `false` if no such
    /// line exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self))]
    pub async fn increment_line(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_item
            SET quantity = $3, status = 'active', updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the quantity of a line, leaving its status alone. Returns `false`
    /// if no such line exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_item
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Toggle a line between active and saved-for-later.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line exists.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        status: CartItemStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_item
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(status)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line exists.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId, item_id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete several lines. Returns how many rows were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self, item_ids), fields(count = item_ids.len()))]
    pub async fn delete_many(
        &self,
        user_id: UserId,
        item_ids: &[CartItemId],
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = item_ids.iter().map(CartItemId::as_i32).collect();
        let result =
            sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1 AND id = ANY($2)")
                .bind(user_id)
                .bind(&ids)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete every line of a user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Move a cart line to the wishlist: insert the wishlist row and delete
    /// the cart row in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already
    /// wishlisted and `RepositoryError::NotFound` if the line is gone.
    #[instrument(skip(self))]
    pub async fn move_to_wishlist(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (wishlist_id,): (WishlistItemId,) = sqlx::query_as(
            r"
            INSERT INTO shop.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "product already in wishlist"))?;

        delete_in_tx(&mut tx, user_id, item_id).await?;

        tx.commit().await?;
        Ok(wishlist_id)
    }
}

/// Delete a cart line inside an open transaction.
pub(crate) async fn delete_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    item_id: CartItemId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Upsert a cart line inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the combined quantity would pass
/// the line maximum; the caller drops the transaction, rolling it back.
pub(crate) async fn upsert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    product_id: ProductId,
    variant: &VariantSelector,
    quantity: i32,
) -> Result<CartItemId, RepositoryError> {
    let row: Option<(CartItemId,)> = sqlx::query_as(UPSERT_LINE)
        .bind(user_id)
        .bind(product_id)
        .bind(&variant.size)
        .bind(&variant.color)
        .bind(quantity)
        .bind(MAX_LINE_QUANTITY)
        .fetch_optional(&mut **tx)
        .await?;
    row.map(|(id,)| id).ok_or_else(line_full)
}

fn line_full() -> RepositoryError {
    RepositoryError::Conflict(format!(
        "cart line would exceed {MAX_LINE_QUANTITY} items"
    ))
}
