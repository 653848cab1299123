//! Compliance and revenue report types.
//!
//! [`RevenueReport::from_daily`] is pure so the window arithmetic can be
//! tested without a database.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use maison_core::types::price::round_money;
use maison_core::{FulfillmentStatus, OrderId, Price, ShipmentId, ShipmentStatus};

/// Paid orders older than this without a shipment are overdue.
pub const DEFAULT_SLA_HOURS: u32 = 48;
/// Open shipments not updated for this long are stale.
pub const DEFAULT_STALE_HOURS: u32 = 72;
/// Revenue window bounds, in days.
pub const MIN_REVENUE_DAYS: u32 = 1;
pub const MAX_REVENUE_DAYS: u32 = 365;

/// Query of `GET /api/reports/compliance`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ComplianceQuery {
    pub sla_hours: Option<u32>,
    pub stale_hours: Option<u32>,
}

impl ComplianceQuery {
    /// `(sla_hours, stale_hours)` with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns a message if either is zero or above a year.
    pub fn resolved(self) -> Result<(u32, u32), String> {
        let sla = self.sla_hours.unwrap_or(DEFAULT_SLA_HOURS);
        let stale = self.stale_hours.unwrap_or(DEFAULT_STALE_HOURS);
        let limit = 24 * MAX_REVENUE_DAYS;
        if !(1..=limit).contains(&sla) || !(1..=limit).contains(&stale) {
            return Err(format!("sla_hours and stale_hours must be 1..={limit}"));
        }
        Ok((sla, stale))
    }
}

/// A paid order still waiting for a shipment past the SLA.
#[derive(Debug, Clone, Serialize)]
pub struct OverdueOrder {
    pub order_id: OrderId,
    pub reference: String,
    pub paid_at: DateTime<Utc>,
    pub hours_waiting: i64,
}

/// An open shipment the carrier has not moved for a while.
#[derive(Debug, Clone, Serialize)]
pub struct StaleShipment {
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub updated_at: DateTime<Utc>,
}

/// Number of orders in one fulfillment status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: FulfillmentStatus,
    pub orders: i64,
}

/// `GET /api/reports/compliance` response.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    pub sla_hours: u32,
    pub stale_hours: u32,
    pub overdue_orders: Vec<OverdueOrder>,
    pub stale_shipments: Vec<StaleShipment>,
    pub fulfillment_counts: Vec<StatusCount>,
}

/// Paid revenue for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Price,
    pub orders: i64,
}

/// `GET /api/analytics/revenue` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueReport {
    pub days: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub daily: Vec<DailyRevenue>,
    pub total_revenue: Price,
    pub total_orders: i64,
    pub average_order_value: Price,
}

/// Check a revenue window.
///
/// # Errors
///
/// Returns a message for windows outside `1..=365`.
pub fn check_window(days: u32) -> Result<u32, String> {
    if (MIN_REVENUE_DAYS..=MAX_REVENUE_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(format!(
            "days must be between {MIN_REVENUE_DAYS} and {MAX_REVENUE_DAYS}"
        ))
    }
}

/// First day of a `days`-long window ending on `today`.
#[must_use]
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days.max(1)) - 1)
}

impl RevenueReport {
    /// Build the report for the `days` ending on `today`, filling days
    /// without sales with zero.
    #[must_use]
    pub fn from_daily(days: u32, today: NaiveDate, rows: &[DailyRevenue]) -> Self {
        let from = window_start(today, days);
        let by_date: HashMap<NaiveDate, &DailyRevenue> =
            rows.iter().map(|row| (row.date, row)).collect();

        let daily: Vec<DailyRevenue> = from
            .iter_days()
            .take_while(|date| *date <= today)
            .map(|date| {
                by_date.get(&date).map_or(
                    DailyRevenue {
                        date,
                        revenue: Price::ZERO,
                        orders: 0,
                    },
                    |row| (*row).clone(),
                )
            })
            .collect();

        let total_revenue = daily
            .iter()
            .fold(Price::ZERO, |acc, day| acc.plus(day.revenue));
        let total_orders: i64 = daily.iter().map(|day| day.orders).sum();
        let average = if total_orders > 0 {
            round_money(total_revenue.amount() / Decimal::from(total_orders))
        } else {
            Decimal::ZERO
        };

        Self {
            days,
            from,
            to: today,
            daily,
            total_revenue,
            total_orders,
            average_order_value: Price::new(average).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn price(s: &str) -> Price {
        Price::parse(s).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        assert!(check_window(0).is_err());
        assert_eq!(check_window(1), Ok(1));
        assert_eq!(check_window(365), Ok(365));
        assert!(check_window(366).is_err());
    }

    #[test]
    fn test_missing_days_are_zero() {
        let rows = vec![DailyRevenue {
            date: date("2026-10-16"),
            revenue: price("3000"),
            orders: 2,
        }];
        let report = RevenueReport::from_daily(3, date("2026-10-17"), &rows);

        assert_eq!(report.from, date("2026-10-15"));
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.daily[0].revenue, Price::ZERO);
        assert_eq!(report.daily[1].orders, 2);
        assert_eq!(report.total_revenue, price("3000"));
        assert_eq!(report.average_order_value, price("1500"));
    }

    #[test]
    fn test_rows_outside_window_ignored() {
        let rows = vec![DailyRevenue {
            date: date("2026-09-01"),
            revenue: price("999"),
            orders: 1,
        }];
        let report = RevenueReport::from_daily(1, date("2026-10-17"), &rows);
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.average_order_value, Price::ZERO);
    }

    #[test]
    fn test_compliance_defaults() {
        assert_eq!(ComplianceQuery::default().resolved(), Ok((48, 72)));
        let zero = ComplianceQuery {
            sla_hours: Some(0),
            stale_hours: None,
        };
        assert!(zero.resolved().is_err());
    }
}
