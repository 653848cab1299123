//! Shipment registration.

use sqlx::PgPool;
use tracing::{info, instrument};

use maison_core::OrderId;

use crate::db::ShipmentRepository;
use crate::error::{AppError, Result};
use crate::models::order::check_shippable;
use crate::models::{NewShipment, Shipment};

pub struct ShipmentService<'a> {
    shipments: ShipmentRepository<'a>,
}

impl<'a> ShipmentService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shipments: ShipmentRepository::new(pool),
        }
    }

    /// Attach a carrier shipment to a paid order and mark it shipped.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for blank fields; `NOT_FOUND` for an unknown order;
    /// `CONFLICT` for an unpaid or cancelled order, or one that already has
    /// a shipment.
    #[instrument(skip(self, request))]
    pub async fn register(&self, order_id: OrderId, request: &NewShipment) -> Result<Shipment> {
        let request = request.validated().map_err(AppError::BadRequest)?;
        let (payment, fulfillment) = self
            .shipments
            .order_statuses(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;
        check_shippable(payment, fulfillment)?;

        let shipment = self.shipments.create(order_id, &request).await?;
        info!(
            shipment_id = %shipment.id,
            carrier = %shipment.carrier,
            tracking_number = %shipment.tracking_number,
            "Shipment registered"
        );
        Ok(shipment)
    }
}
