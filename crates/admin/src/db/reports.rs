//! Read-only queries behind the compliance and revenue reports.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, QueryBuilder};

use maison_core::{FulfillmentStatus, OrderId, Price, ShipmentId, ShipmentStatus};

use super::RepositoryError;
use crate::models::DailyRevenue;
use crate::models::report::{OverdueOrder, StaleShipment, StatusCount};

#[derive(sqlx::FromRow)]
struct OverdueRow {
    order_id: OrderId,
    reference: String,
    paid_at: DateTime<Utc>,
    hours_waiting: i64,
}

#[derive(sqlx::FromRow)]
struct StaleRow {
    shipment_id: ShipmentId,
    order_id: OrderId,
    tracking_number: String,
    status: ShipmentStatus,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CountRow {
    status: FulfillmentStatus,
    orders: i64,
}

#[derive(sqlx::FromRow)]
struct DailyRow {
    date: NaiveDate,
    revenue: Price,
    orders: i64,
}

pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paid orders with no shipment, paid more than `sla_hours` ago.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn overdue_orders(&self, sla_hours: u32) -> Result<Vec<OverdueOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, OverdueRow>(
            r#"
            SELECT o.id AS order_id, o.reference, o.paid_at,
                   (EXTRACT(EPOCH FROM NOW() - o.paid_at) / 3600)::BIGINT AS hours_waiting
            FROM shop."order" o
            LEFT JOIN shop.order_shipment s ON s.order_id = o.id
            WHERE o.payment_status = 'paid'
              AND o.fulfillment_status <> 'cancelled'
              AND s.id IS NULL
              AND o.paid_at < NOW() - make_interval(hours => $1)
            ORDER BY o.paid_at
            "#,
        )
        .bind(i32::try_from(sla_hours).unwrap_or(i32::MAX))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OverdueOrder {
                order_id: r.order_id,
                reference: r.reference,
                paid_at: r.paid_at,
                hours_waiting: r.hours_waiting,
            })
            .collect())
    }

    /// Open shipments not updated for `stale_hours`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stale_shipments(
        &self,
        stale_hours: u32,
    ) -> Result<Vec<StaleShipment>, RepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT id AS shipment_id, order_id, tracking_number, status, updated_at
             FROM shop.order_shipment
             WHERE updated_at < NOW() - make_interval(hours => ",
        );
        builder
            .push_bind(i32::try_from(stale_hours).unwrap_or(i32::MAX))
            .push(") AND status NOT IN (");
        let mut terminal = builder.separated(", ");
        for status in ShipmentStatus::TERMINAL {
            terminal.push_bind(status);
        }
        builder.push(") ORDER BY updated_at");

        let rows = builder
            .build_query_as::<StaleRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| StaleShipment {
                shipment_id: r.shipment_id,
                order_id: r.order_id,
                tracking_number: r.tracking_number,
                status: r.status,
                updated_at: r.updated_at,
            })
            .collect())
    }

    /// Order count per fulfillment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn fulfillment_counts(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CountRow>(
            r#"
            SELECT fulfillment_status AS status, COUNT(*) AS orders
            FROM shop."order"
            GROUP BY fulfillment_status
            ORDER BY fulfillment_status
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                orders: r.orders,
            })
            .collect())
    }

    /// Paid revenue per UTC day from `from` onwards. Days without sales
    /// are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_revenue(&self, from: NaiveDate) -> Result<Vec<DailyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT (paid_at AT TIME ZONE 'UTC')::DATE AS date,
                   SUM(total) AS revenue,
                   COUNT(*) AS orders
            FROM shop."order"
            WHERE payment_status = 'paid'
              AND paid_at >= ($1::DATE)::TIMESTAMP AT TIME ZONE 'UTC'
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(from)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyRevenue {
                date: r.date,
                revenue: r.revenue,
                orders: r.orders,
            })
            .collect())
    }
}
