//! Internal endpoints called by the admin service.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, warn};

use maison_core::signature::bearer_matches;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of `POST /internal/revalidate`. Without a slug every catalog entry
/// is dropped.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidateRequest {
    pub slug: Option<String>,
}

/// `POST /internal/revalidate` (bearer `REVALIDATE_SECRET`)
pub async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RevalidateRequest>>,
) -> Result<StatusCode> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !bearer_matches(header, state.config().revalidate_secret.expose_secret()) {
        warn!("Rejected revalidation with bad bearer token");
        return Err(AppError::Unauthorized("invalid revalidation token".to_string()));
    }

    let request = body.map(|Json(b)| b).unwrap_or_default();
    match request.slug.as_deref() {
        Some(slug) => {
            state.cache().invalidate_product(slug).await;
            // Listings may include the product under any filter.
            state.cache().invalidate_catalog();
            info!(slug, "Revalidated product");
        }
        None => {
            state.cache().invalidate_catalog();
            info!("Revalidated catalog");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
