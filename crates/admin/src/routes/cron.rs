//! Scheduled jobs triggered by an external scheduler.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::AUTHORIZATION},
};
use secrecy::ExposeSecret;
use tracing::warn;

use maison_core::signature::bearer_matches;

use crate::error::{AppError, Result};
use crate::services::shipment_poll::{PollSummary, poll_once};
use crate::state::AppState;

/// `POST /cron/shipments/poll` (bearer `CRON_SECRET`)
pub async fn poll_shipments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PollSummary>> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !bearer_matches(header, state.config().cron_secret.expose_secret()) {
        warn!("Rejected cron call with bad bearer token");
        return Err(AppError::Unauthorized("invalid cron token".to_string()));
    }

    let summary = poll_once(state.pool(), state.carrier()).await?;
    Ok(Json(summary))
}
