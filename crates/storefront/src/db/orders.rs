//! Order persistence: checkout, history, cancellation, payment and expiry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use maison_core::{
    CouponId, FulfillmentStatus, OrderId, PaymentStatus, Price, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{AddressSnapshot, CartItem, CheckoutTotals, Order, OrderItem};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    reference: String,
    shipping_address: Json<AddressSnapshot>,
    subtotal: Price,
    discount: Price,
    total: Price,
    coupon_code: Option<String>,
    payment_status: PaymentStatus,
    fulfillment_status: FulfillmentStatus,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            reference: self.reference,
            shipping_address: self.shipping_address.0,
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            coupon_code: self.coupon_code,
            payment_status: self.payment_status,
            fulfillment_status: self.fulfillment_status,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    size: String,
    color: String,
    quantity: i32,
    unit_price: Price,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            size: row.size,
            color: row.color,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.unit_price.times(row.quantity),
        }
    }
}

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.reference, o.shipping_address, o.subtotal, o.discount, o.total,
           c.code AS coupon_code, o.payment_status, o.fulfillment_status,
           o.payment_reference, o.created_at, o.updated_at
    FROM shop."order" o
    LEFT JOIN shop.coupon c ON c.id = o.coupon_id
"#;

/// Everything checkout writes.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub reference: &'a str,
    pub shipping_address: &'a AddressSnapshot,
    pub totals: CheckoutTotals,
    pub coupon_id: Option<CouponId>,
    pub items: &'a [CartItem],
}

async fn release_coupon(
    tx: &mut Transaction<'_, Postgres>,
    coupon_id: CouponId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        UPDATE shop.coupon
        SET used_count = GREATEST(used_count - 1, 0), updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(coupon_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, product_id, product_name, size, color, quantity, unit_price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            by_order.entry(item.order_id).or_default().push(item.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    /// Create an order from checked-out cart lines in one transaction:
    /// insert the order and its items, count the coupon use and delete the
    /// cart lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the coupon ran out of uses or
    /// a cart line vanished concurrently.
    #[instrument(skip(self, order), fields(user_id = %order.user_id, reference = order.reference))]
    pub async fn create_from_cart(&self, order: &NewOrder<'_>) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (OrderId,) = sqlx::query_as(
            r#"
            INSERT INTO shop."order" (reference, user_id, shipping_address, subtotal, discount, total, coupon_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(order.reference)
        .bind(order.user_id)
        .bind(Json(order.shipping_address))
        .bind(order.totals.subtotal)
        .bind(order.totals.discount)
        .bind(order.totals.total)
        .bind(order.coupon_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order reference collision"))?;

        for item in order.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_item (order_id, product_id, product_name, size, color, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.variant.size)
            .bind(&item.variant.color)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(coupon_id) = order.coupon_id {
            let counted = sqlx::query(
                r"
                UPDATE shop.coupon
                SET used_count = used_count + 1, updated_at = NOW()
                WHERE id = $1 AND (usage_limit IS NULL OR used_count < usage_limit)
                ",
            )
            .bind(coupon_id)
            .execute(&mut *tx)
            .await?;
            if counted.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "coupon usage limit reached".to_string(),
                ));
            }
        }

        let line_ids: Vec<i32> = order.items.iter().map(|i| i.id.as_i32()).collect();
        let removed = sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1 AND id = ANY($2)")
            .bind(order.user_id)
            .bind(&line_ids)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() != line_ids.len() as u64 {
            return Err(RepositoryError::Conflict(
                "cart changed during checkout".to_string(),
            ));
        }

        tx.commit().await?;
        Ok(order_id)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// One of a user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1 AND o.user_id = $2");
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![row]).await?.pop())
    }

    /// Cancel a pending order and release its coupon use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is no longer pending.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: UserId, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let row: Option<(Option<CouponId>,)> = sqlx::query_as(
            r#"
            UPDATE shop."order"
            SET payment_status = 'cancelled', fulfillment_status = 'cancelled',
                cancelled_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND payment_status = 'pending'
            RETURNING coupon_id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((coupon_id,)) = row else {
            return Err(RepositoryError::Conflict("order is not pending".to_string()));
        };
        if let Some(coupon_id) = coupon_id {
            release_coupon(&mut tx, coupon_id).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Mark a pending order paid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is no longer pending.
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        user_id: UserId,
        id: OrderId,
        payment_reference: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE shop."order"
            SET payment_status = 'paid', fulfillment_status = 'processing',
                payment_reference = $3, paid_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND payment_status = 'pending'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(payment_reference)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict("order is not pending".to_string()));
        }
        Ok(())
    }

    /// Cancel every order still pending since before `cutoff` and release
    /// their coupon uses. Returns the number of orders cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    #[instrument(skip(self))]
    pub async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let expired: Vec<(OrderId, Option<CouponId>)> = sqlx::query_as(
            r#"
            UPDATE shop."order"
            SET payment_status = 'cancelled', fulfillment_status = 'cancelled',
                cancelled_at = NOW(), updated_at = NOW()
            WHERE payment_status = 'pending' AND created_at < $1
            RETURNING id, coupon_id
            "#,
        )
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await?;

        for coupon_id in expired.iter().filter_map(|(_, coupon)| *coupon) {
            release_coupon(&mut tx, coupon_id).await?;
        }
        tx.commit().await?;
        Ok(expired.len() as u64)
    }
}
