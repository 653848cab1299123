//! Order and shipment views for the admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maison_core::{
    FulfillmentStatus, OrderId, PaymentStatus, Price, ShipmentId, ShipmentStatus,
};

/// One order row in the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    pub id: OrderId,
    pub reference: String,
    pub customer_email: String,
    pub total: Price,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub item_count: i64,
    pub shipment_status: Option<ShipmentStatus>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Admin order listing filters (`GET /api/orders`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub payment_status: Option<PaymentStatus>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl OrderFilter {
    pub const DEFAULT_PER_PAGE: u32 = 50;
    pub const MAX_PER_PAGE: u32 = 200;

    /// `(limit, offset)` for the requested page.
    #[must_use]
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self
            .per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        (i64::from(per_page), i64::from(page - 1) * i64::from(per_page))
    }
}

/// A registered shipment.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub carrier: String,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/orders/{id}/shipment`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewShipment {
    pub carrier: String,
    pub tracking_number: String,
}

impl NewShipment {
    /// Trim both fields and require them to be present.
    ///
    /// # Errors
    ///
    /// Returns a message naming the blank or oversized field.
    pub fn validated(&self) -> Result<Self, String> {
        let carrier = self.carrier.trim();
        let tracking_number = self.tracking_number.trim();
        if carrier.is_empty() || carrier.len() > 64 {
            return Err("carrier must be 1-64 characters".to_string());
        }
        if tracking_number.is_empty()
            || tracking_number.len() > 64
            || !tracking_number.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err("tracking_number must be 1-64 letters, digits or '-'".to_string());
        }
        Ok(Self {
            carrier: carrier.to_string(),
            tracking_number: tracking_number.to_string(),
        })
    }
}

/// Reasons an order cannot be shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShipmentRuleError {
    #[error("order has not been paid")]
    NotPaid,
    #[error("order is cancelled")]
    Cancelled,
}

/// Check that an order may get a shipment.
///
/// # Errors
///
/// `Cancelled` for a cancelled order, `NotPaid` for anything not yet paid.
pub const fn check_shippable(
    payment: PaymentStatus,
    fulfillment: FulfillmentStatus,
) -> Result<(), ShipmentRuleError> {
    if matches!(fulfillment, FulfillmentStatus::Cancelled)
        || matches!(payment, PaymentStatus::Cancelled)
    {
        return Err(ShipmentRuleError::Cancelled);
    }
    if !matches!(payment, PaymentStatus::Paid) {
        return Err(ShipmentRuleError::NotPaid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset() {
        let filter = OrderFilter {
            page: Some(3),
            per_page: Some(20),
            ..OrderFilter::default()
        };
        assert_eq!(filter.limit_offset(), (20, 40));

        let clamped = OrderFilter {
            page: Some(0),
            per_page: Some(10_000),
            ..OrderFilter::default()
        };
        assert_eq!(clamped.limit_offset(), (200, 0));
    }

    #[test]
    fn test_only_paid_orders_ship() {
        assert_eq!(
            check_shippable(PaymentStatus::Paid, FulfillmentStatus::Processing),
            Ok(())
        );
        assert_eq!(
            check_shippable(PaymentStatus::Pending, FulfillmentStatus::Unfulfilled),
            Err(ShipmentRuleError::NotPaid)
        );
        assert_eq!(
            check_shippable(PaymentStatus::Cancelled, FulfillmentStatus::Cancelled),
            Err(ShipmentRuleError::Cancelled)
        );
    }

    #[test]
    fn test_new_shipment_validation() {
        let ok = NewShipment {
            carrier: " Delhivery ".to_string(),
            tracking_number: "AWB-1234".to_string(),
        }
        .validated();
        assert_eq!(ok.map(|s| s.carrier), Ok("Delhivery".to_string()));

        let bad = NewShipment {
            carrier: "Delhivery".to_string(),
            tracking_number: "AWB 1234".to_string(),
        };
        assert!(bad.validated().is_err());
    }
}
