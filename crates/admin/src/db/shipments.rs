//! Shipment registration and carrier poll persistence.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, QueryBuilder};
use tracing::instrument;

use maison_core::{FulfillmentStatus, OrderId, PaymentStatus, ShipmentId, ShipmentStatus};

use super::RepositoryError;
use crate::models::{NewShipment, Shipment};

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: ShipmentId,
    order_id: OrderId,
    carrier: String,
    tracking_number: String,
    status: ShipmentStatus,
    last_polled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShipmentRow> for Shipment {
    fn from(row: ShipmentRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            carrier: row.carrier,
            tracking_number: row.tracking_number,
            status: row.status,
            last_polled_at: row.last_polled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderStatusRow {
    payment_status: PaymentStatus,
    fulfillment_status: FulfillmentStatus,
}

const COLUMNS: &str =
    "id, order_id, carrier, tracking_number, status, last_polled_at, created_at, updated_at";

/// What one poll observed for a shipment.
#[derive(Debug)]
pub struct PollUpdate<'a> {
    pub payload: &'a Value,
    /// New status, only when it differs from the stored one.
    pub status: Option<ShipmentStatus>,
    /// Fulfillment status to cascade onto the order.
    pub cascade: Option<FulfillmentStatus>,
}

pub struct ShipmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShipmentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Payment and fulfillment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_statuses(
        &self,
        order_id: OrderId,
    ) -> Result<Option<(PaymentStatus, FulfillmentStatus)>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderStatusRow>(
            r#"SELECT payment_status, fulfillment_status FROM shop."order" WHERE id = $1"#,
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.payment_status, r.fulfillment_status)))
    }

    /// Register the shipment of a paid order and mark the order shipped.
    ///
    /// The order row is re-checked under lock, so an order cancelled
    /// between the caller's check and this write is not shipped.
    ///
    /// # Errors
    ///
    /// `Conflict` if the order already has a shipment or stopped being
    /// shippable.
    #[instrument(skip(self, shipment), fields(tracking_number = %shipment.tracking_number))]
    pub async fn create(
        &self,
        order_id: OrderId,
        shipment: &NewShipment,
    ) -> Result<Shipment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query(
            r#"
            SELECT id FROM shop."order"
            WHERE id = $1 AND payment_status = 'paid' AND fulfillment_status <> 'cancelled'
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(RepositoryError::Conflict(
                "order is no longer eligible for shipment".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "INSERT INTO shop.order_shipment (order_id, carrier, tracking_number)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(order_id)
        .bind(&shipment.carrier)
        .bind(&shipment.tracking_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "order already has a shipment"))?;

        sqlx::query(
            r#"
            UPDATE shop."order"
            SET fulfillment_status = 'shipped', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Shipments the carrier may still move, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_open(&self) -> Result<Vec<Shipment>, RepositoryError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM shop.order_shipment WHERE status NOT IN ("
        ));
        let mut terminal = builder.separated(", ");
        for status in ShipmentStatus::TERMINAL {
            terminal.push_bind(status);
        }
        builder.push(") ORDER BY created_at");

        let rows = builder
            .build_query_as::<ShipmentRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Store a poll result: always the payload, the status and the order
    /// cascade only when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a write fails.
    #[instrument(skip(self, update), fields(shipment_id = %shipment.id))]
    pub async fn record_poll(
        &self,
        shipment: &Shipment,
        update: &PollUpdate<'_>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match update.status {
            Some(status) => {
                sqlx::query(
                    "UPDATE shop.order_shipment
                     SET last_payload = $2, last_polled_at = NOW(), status = $3, updated_at = NOW()
                     WHERE id = $1",
                )
                .bind(shipment.id)
                .bind(update.payload)
                .bind(status)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE shop.order_shipment
                     SET last_payload = $2, last_polled_at = NOW()
                     WHERE id = $1",
                )
                .bind(shipment.id)
                .bind(update.payload)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(fulfillment) = update.cascade {
            sqlx::query(
                r#"
                UPDATE shop."order"
                SET fulfillment_status = $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(shipment.order_id)
            .bind(fulfillment)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
