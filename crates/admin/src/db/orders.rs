//! Order listing for the admin.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;

use maison_core::{FulfillmentStatus, OrderId, PaymentStatus, Price, ShipmentStatus};

use super::RepositoryError;
use crate::models::{AdminOrder, OrderFilter};

#[derive(sqlx::FromRow)]
struct AdminOrderRow {
    id: OrderId,
    reference: String,
    customer_email: String,
    total: Price,
    payment_status: PaymentStatus,
    fulfillment_status: FulfillmentStatus,
    item_count: i64,
    shipment_status: Option<ShipmentStatus>,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl From<AdminOrderRow> for AdminOrder {
    fn from(row: AdminOrderRow) -> Self {
        Self {
            id: row.id,
            reference: row.reference,
            customer_email: row.customer_email,
            total: row.total,
            payment_status: row.payment_status,
            fulfillment_status: row.fulfillment_status,
            item_count: row.item_count,
            shipment_status: row.shipment_status,
            created_at: row.created_at,
            paid_at: row.paid_at,
        }
    }
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders across all customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<AdminOrder>, RepositoryError> {
        let (limit, offset) = filter.limit_offset();
        let mut builder = QueryBuilder::new(
            r#"
            SELECT o.id, o.reference, u.email AS customer_email, o.total,
                   o.payment_status, o.fulfillment_status,
                   COALESCE((SELECT SUM(i.quantity) FROM shop.order_item i
                             WHERE i.order_id = o.id), 0)::BIGINT AS item_count,
                   s.status AS shipment_status, o.created_at, o.paid_at
            FROM shop."order" o
            JOIN shop.user u ON u.id = o.user_id
            LEFT JOIN shop.order_shipment s ON s.order_id = o.id
            WHERE TRUE"#,
        );
        if let Some(status) = filter.payment_status {
            builder.push(" AND o.payment_status = ").push_bind(status);
        }
        if let Some(status) = filter.fulfillment_status {
            builder.push(" AND o.fulfillment_status = ").push_bind(status);
        }
        builder
            .push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<AdminOrderRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
