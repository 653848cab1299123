//! Catalog handlers (`/api/products`).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::error::Result;
use crate::models::{ProductDetail, ProductFilter, ProductPage};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// `GET /api/products?category=&brand=&section=&q=&page=&per_page=`
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Arc<ProductPage>>> {
    let page = CatalogService::new(state.pool(), state.cache())
        .list(filter)
        .await?;
    Ok(Json(page))
}

/// `GET /api/products/{slug}`
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Arc<ProductDetail>>> {
    let detail = CatalogService::new(state.pool(), state.cache())
        .detail(&slug)
        .await?;
    Ok(Json(detail))
}
