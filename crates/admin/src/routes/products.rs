//! Catalog curation: feature toggles, section listings and CSV import.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use tracing::instrument;

use maison_core::{ProductFeature, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{FeatureToggle, ImportSummary, SectionEntry, ToggleAction};
use crate::services::import::ImportService;
use crate::services::sections::SectionService;
use crate::state::AppState;

fn parse_feature(raw: &str) -> Result<ProductFeature> {
    raw.parse::<ProductFeature>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn toggle(
    state: &AppState,
    product_id: ProductId,
    feature: &str,
    action: ToggleAction,
) -> Result<Json<FeatureToggle>> {
    let feature = parse_feature(feature)?;
    let toggle = SectionService::new(state.pool(), state.revalidator())
        .toggle(product_id, feature, action)
        .await?;
    Ok(Json(toggle))
}

/// `POST /api/products/{id}/features/{feature}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn add_feature(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path((product_id, feature)): Path<(ProductId, String)>,
) -> Result<Json<FeatureToggle>> {
    toggle(&state, product_id, &feature, ToggleAction::Add).await
}

/// `DELETE /api/products/{id}/features/{feature}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove_feature(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path((product_id, feature)): Path<(ProductId, String)>,
) -> Result<Json<FeatureToggle>> {
    toggle(&state, product_id, &feature, ToggleAction::Remove).await
}

/// `GET /api/sections/{feature}`
pub async fn section(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Path(feature): Path<String>,
) -> Result<Json<Vec<SectionEntry>>> {
    let feature = parse_feature(&feature)?;
    let entries = SectionService::new(state.pool(), state.revalidator())
        .list(feature)
        .await?;
    Ok(Json(entries))
}

/// `POST /api/products/import` (multipart field `file`)
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn import(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>> {
    let mut body = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("malformed upload: {e}")))?;
            body = Some(bytes);
        }
    }
    let body = body.ok_or_else(|| AppError::BadRequest("missing 'file' field".to_string()))?;

    let summary = ImportService::new(state.pool(), state.revalidator())
        .import_csv(&body)
        .await?;
    Ok(Json(summary))
}
