//! Carrier status poll.
//!
//! Walks every open shipment in order, one carrier request at a time. Each
//! response's payload is stored; the status only when the scan label maps
//! to something new. Delivery outcomes cascade onto the order.
//!
//! A transport failure skips that shipment. A response we cannot read
//! aborts the run, since it usually means the carrier changed its format
//! and every later shipment would fail the same way.

use serde::Serialize;
use sqlx::PgPool;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{error, info, instrument, warn};

use maison_core::carrier::{next_status, order_cascade};
use maison_core::{FulfillmentStatus, ShipmentStatus};

use crate::carrier::CarrierClient;
use crate::db::ShipmentRepository;
use crate::db::shipments::PollUpdate;
use crate::error::Result;

/// Outcome of one poll run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    /// Shipments the carrier answered for.
    pub checked: usize,
    /// Shipments whose status changed.
    pub updated: usize,
    /// Shipments skipped after a transport failure.
    pub skipped: usize,
}

/// Status change and order cascade implied by a scan label.
///
/// Both are `None` when the label is unknown or maps to the status the
/// shipment already has.
#[must_use]
pub fn plan_update(
    prior: ShipmentStatus,
    scan: &str,
) -> (Option<ShipmentStatus>, Option<FulfillmentStatus>) {
    let next = next_status(prior, scan);
    if next == prior {
        return (None, None);
    }
    (Some(next), order_cascade(next))
}

/// Poll the carrier for every open shipment.
///
/// # Errors
///
/// `AppError::Carrier` for an unreadable carrier response;
/// `AppError::Database` if a read or write fails.
#[instrument(skip_all)]
pub async fn poll_once(pool: &PgPool, carrier: &CarrierClient) -> Result<PollSummary> {
    let shipments = ShipmentRepository::new(pool);
    let open = shipments.list_open().await?;
    let mut summary = PollSummary::default();

    for shipment in &open {
        let tracking = match carrier.track(&shipment.tracking_number).await {
            Ok(tracking) => tracking,
            Err(e) if e.is_transport() => {
                warn!(
                    shipment_id = %shipment.id,
                    tracking_number = %shipment.tracking_number,
                    error = %e,
                    "Carrier lookup failed; skipping shipment"
                );
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let (status, cascade) = plan_update(shipment.status, &tracking.status);
        shipments
            .record_poll(
                shipment,
                &PollUpdate {
                    payload: &tracking.raw,
                    status,
                    cascade,
                },
            )
            .await?;

        summary.checked += 1;
        if let Some(status) = status {
            summary.updated += 1;
            info!(
                shipment_id = %shipment.id,
                from = ?shipment.status,
                to = ?status,
                "Shipment status changed"
            );
        }
    }

    info!(
        open = open.len(),
        checked = summary.checked,
        updated = summary.updated,
        skipped = summary.skipped,
        "Carrier poll finished"
    );
    Ok(summary)
}

/// Poll on a fixed interval until the task is dropped.
pub async fn run(pool: PgPool, carrier: CarrierClient, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = every.as_secs(), "Shipment poller started");

    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(&pool, &carrier).await {
            error!(error = %e, "Shipment poll failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_status_is_recorded() {
        assert_eq!(
            plan_update(ShipmentStatus::PickedUp, "In Transit"),
            (Some(ShipmentStatus::InTransit), None)
        );
    }

    #[test]
    fn test_same_status_writes_nothing() {
        assert_eq!(plan_update(ShipmentStatus::InTransit, "  in   transit "), (None, None));
    }

    #[test]
    fn test_unknown_label_keeps_prior() {
        assert_eq!(
            plan_update(ShipmentStatus::OutForDelivery, "Held at customs"),
            (None, None)
        );
    }

    #[test]
    fn test_delivery_cascades() {
        assert_eq!(
            plan_update(ShipmentStatus::OutForDelivery, "Delivered"),
            (Some(ShipmentStatus::Delivered), Some(FulfillmentStatus::Delivered))
        );
        assert_eq!(
            plan_update(ShipmentStatus::RtoInitiated, "RTO Delivered"),
            (Some(ShipmentStatus::RtoDelivered), Some(FulfillmentStatus::Returned))
        );
    }

    #[test]
    fn test_failed_delivery_does_not_cascade() {
        assert_eq!(
            plan_update(ShipmentStatus::OutForDelivery, "Undelivered"),
            (Some(ShipmentStatus::DeliveryFailed), None)
        );
    }
}
