//! Compliance report and revenue analytics.
//!
//! Revenue reports are cached per window length for 10 minutes; they are
//! read far more often than orders are paid and a slightly old figure is
//! acceptable on a dashboard.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use crate::db::ReportRepository;
use crate::error::{AppError, Result};
use crate::models::report::{ComplianceQuery, check_window, window_start};
use crate::models::{ComplianceReport, RevenueReport};

const REVENUE_CACHE_CAPACITY: u64 = 400;
const REVENUE_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Revenue reports keyed by window length in days. Cheap to clone.
#[derive(Clone)]
pub struct AnalyticsCache {
    revenue: Cache<u32, Arc<RevenueReport>>,
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            revenue: Cache::builder()
                .max_capacity(REVENUE_CACHE_CAPACITY)
                .time_to_live(REVENUE_CACHE_TTL)
                .build(),
        }
    }
}

pub struct ReportService<'a> {
    reports: ReportRepository<'a>,
    cache: &'a AnalyticsCache,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a AnalyticsCache) -> Self {
        Self {
            reports: ReportRepository::new(pool),
            cache,
        }
    }

    /// Orders past the shipping SLA, stalled shipments and per-status counts.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for out-of-range thresholds.
    #[instrument(skip(self))]
    pub async fn compliance(&self, query: ComplianceQuery) -> Result<ComplianceReport> {
        let (sla_hours, stale_hours) = query.resolved().map_err(AppError::BadRequest)?;

        Ok(ComplianceReport {
            generated_at: Utc::now(),
            sla_hours,
            stale_hours,
            overdue_orders: self.reports.overdue_orders(sla_hours).await?,
            stale_shipments: self.reports.stale_shipments(stale_hours).await?,
            fulfillment_counts: self.reports.fulfillment_counts().await?,
        })
    }

    /// Daily paid revenue for the last `days` days, today included.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for a window outside `1..=365`.
    #[instrument(skip(self))]
    pub async fn revenue(&self, days: u32) -> Result<Arc<RevenueReport>> {
        let days = check_window(days).map_err(AppError::BadRequest)?;
        if let Some(hit) = self.cache.revenue.get(&days).await {
            debug!("Revenue report cache hit");
            return Ok(hit);
        }

        let today = Utc::now().date_naive();
        let rows = self.reports.daily_revenue(window_start(today, days)).await?;
        let report = Arc::new(RevenueReport::from_daily(days, today, &rows));
        self.cache.revenue.insert(days, Arc::clone(&report)).await;
        Ok(report)
    }
}
