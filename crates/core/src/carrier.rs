//! Carrier scan-status vocabulary.
//!
//! The carrier reports shipment progress as free-text scan labels
//! ("Out For Delivery", "RTO Initiated", ...). This module owns the static
//! lookup from that vocabulary into [`ShipmentStatus`], and the cascade from
//! a shipment status onto the order's fulfillment status.
//!
//! Everything here is pure: the shipment poller decides what to persist
//! from the return values.

use crate::types::{FulfillmentStatus, ShipmentStatus};

/// Carrier scan labels (normalized: lower-case, single spaces) and the
/// internal status each one maps to.
const SCAN_STATUS_TABLE: &[(&str, ShipmentStatus)] = &[
    ("manifested", ShipmentStatus::LabelCreated),
    ("shipment booked", ShipmentStatus::LabelCreated),
    ("label generated", ShipmentStatus::LabelCreated),
    ("pickup scheduled", ShipmentStatus::LabelCreated),
    ("pickup generated", ShipmentStatus::LabelCreated),
    ("picked up", ShipmentStatus::PickedUp),
    ("pickup completed", ShipmentStatus::PickedUp),
    ("shipped", ShipmentStatus::InTransit),
    ("in transit", ShipmentStatus::InTransit),
    ("dispatched", ShipmentStatus::InTransit),
    ("reached at destination hub", ShipmentStatus::InTransit),
    ("reached destination", ShipmentStatus::InTransit),
    ("out for delivery", ShipmentStatus::OutForDelivery),
    ("delivered", ShipmentStatus::Delivered),
    ("undelivered", ShipmentStatus::DeliveryFailed),
    ("delivery failed", ShipmentStatus::DeliveryFailed),
    ("delivery attempted", ShipmentStatus::DeliveryFailed),
    ("rto initiated", ShipmentStatus::RtoInitiated),
    ("rto in transit", ShipmentStatus::RtoInitiated),
    ("rto out for delivery", ShipmentStatus::RtoInitiated),
    ("rto delivered", ShipmentStatus::RtoDelivered),
    ("returned to origin", ShipmentStatus::RtoDelivered),
    ("cancelled", ShipmentStatus::Cancelled),
    ("canceled", ShipmentStatus::Cancelled),
    ("shipment cancelled", ShipmentStatus::Cancelled),
];

/// Map a carrier scan label to an internal status.
///
/// Matching is case-insensitive and ignores surrounding and repeated
/// whitespace. Returns `None` for labels outside the known vocabulary.
#[must_use]
pub fn map_scan_status(scan: &str) -> Option<ShipmentStatus> {
    let normalized = scan
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    SCAN_STATUS_TABLE
        .iter()
        .find(|(label, _)| *label == normalized)
        .map(|(_, status)| *status)
}

/// The status a shipment should have after observing `scan`.
///
/// Unknown labels leave `prior` unchanged.
#[must_use]
pub fn next_status(prior: ShipmentStatus, scan: &str) -> ShipmentStatus {
    map_scan_status(scan).unwrap_or(prior)
}

/// Order fulfillment status implied by a shipment status, if any.
///
/// Only the two terminal delivery outcomes cascade onto the order.
#[must_use]
pub const fn order_cascade(status: ShipmentStatus) -> Option<FulfillmentStatus> {
    match status {
        ShipmentStatus::Delivered => Some(FulfillmentStatus::Delivered),
        ShipmentStatus::RtoDelivered => Some(FulfillmentStatus::Returned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_map_deterministically() {
        assert_eq!(map_scan_status("Delivered"), Some(ShipmentStatus::Delivered));
        assert_eq!(
            map_scan_status("OUT FOR DELIVERY"),
            Some(ShipmentStatus::OutForDelivery)
        );
        assert_eq!(
            map_scan_status("  rto   initiated "),
            Some(ShipmentStatus::RtoInitiated)
        );
        assert_eq!(map_scan_status("Canceled"), Some(ShipmentStatus::Cancelled));
    }

    #[test]
    fn test_every_table_entry_maps_to_itself() {
        for (label, status) in SCAN_STATUS_TABLE {
            assert_eq!(map_scan_status(label), Some(*status), "label {label}");
        }
    }

    #[test]
    fn test_unknown_label_keeps_prior_status() {
        assert_eq!(map_scan_status("Weather delay"), None);
        assert_eq!(
            next_status(ShipmentStatus::InTransit, "Weather delay"),
            ShipmentStatus::InTransit
        );
        assert_eq!(
            next_status(ShipmentStatus::InTransit, ""),
            ShipmentStatus::InTransit
        );
    }

    #[test]
    fn test_next_status_applies_known_label() {
        assert_eq!(
            next_status(ShipmentStatus::InTransit, "Delivered"),
            ShipmentStatus::Delivered
        );
    }

    #[test]
    fn test_order_cascade_only_for_terminal_outcomes() {
        assert_eq!(
            order_cascade(ShipmentStatus::Delivered),
            Some(FulfillmentStatus::Delivered)
        );
        assert_eq!(
            order_cascade(ShipmentStatus::RtoDelivered),
            Some(FulfillmentStatus::Returned)
        );
        assert_eq!(order_cascade(ShipmentStatus::Cancelled), None);
        assert_eq!(order_cascade(ShipmentStatus::OutForDelivery), None);
    }
}
