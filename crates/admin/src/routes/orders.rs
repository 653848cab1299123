//! Order listing and shipment registration.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use maison_core::OrderId;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{AdminOrder, NewShipment, OrderFilter, Shipment};
use crate::services::shipments::ShipmentService;
use crate::state::AppState;

/// `GET /api/orders?payment_status=&fulfillment_status=&page=&per_page=`
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<AdminOrder>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(&filter).await?))
}

/// `POST /api/orders/{id}/shipment`
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create_shipment(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path(order_id): Path<OrderId>,
    Json(body): Json<NewShipment>,
) -> Result<(StatusCode, Json<Shipment>)> {
    let shipment = ShipmentService::new(state.pool())
        .register(order_id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}
