//! Coupon route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use maison_core::CouponId;

use crate::error::Result;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{Coupon, CouponDraft, CouponPatch, CouponRemoval};
use crate::services::coupons::CouponService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RemovalResponse {
    pub id: CouponId,
    pub result: CouponRemoval,
}

/// `GET /api/coupons`
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(CouponService::new(state.pool()).list().await?))
}

/// `GET /api/coupons/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Path(id): Path<CouponId>,
) -> Result<Json<Coupon>> {
    Ok(Json(CouponService::new(state.pool()).get(id).await?))
}

/// `POST /api/coupons`
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Json(draft): Json<CouponDraft>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let coupon = CouponService::new(state.pool()).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// `PATCH /api/coupons/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<CouponId>,
    Json(patch): Json<CouponPatch>,
) -> Result<Json<Coupon>> {
    Ok(Json(CouponService::new(state.pool()).update(id, patch).await?))
}

/// `DELETE /api/coupons/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<CouponId>,
) -> Result<Json<RemovalResponse>> {
    let result = CouponService::new(state.pool()).delete(id).await?;
    Ok(Json(RemovalResponse { id, result }))
}
