//! Reporting route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::models::report::ComplianceQuery;
use crate::models::{ComplianceReport, RevenueReport};
use crate::services::reports::ReportService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

const fn default_days() -> u32 {
    30
}

/// `GET /api/reports/compliance?sla_hours=48&stale_hours=72`
pub async fn compliance(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Query(query): Query<ComplianceQuery>,
) -> Result<Json<ComplianceReport>> {
    let report = ReportService::new(state.pool(), state.analytics())
        .compliance(query)
        .await?;
    Ok(Json(report))
}

/// `GET /api/analytics/revenue?days=30`
pub async fn revenue(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Query(query): Query<RevenueQuery>,
) -> Result<Json<Arc<RevenueReport>>> {
    let report = ReportService::new(state.pool(), state.analytics())
        .revenue(query.days)
        .await?;
    Ok(Json(report))
}
