//! Checkout and order handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use maison_core::OrderId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAuth, ensure_owner};
use crate::models::Order;
use crate::services::orders::{CheckoutRequest, OrderService, PaymentConfirmation};
use crate::state::AppState;

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(state.pool(), state.cache())
}

/// `POST /api/checkout`
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    ensure_owner(&user, body.user_id)?;
    add_breadcrumb("checkout", "Checkout started", None);
    let order = service(&state).checkout(&body).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(service(&state).list(user.id).await?))
}

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(service(&state).get(user.id, id).await?))
}

/// `POST /api/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(service(&state).cancel(user.id, id).await?))
}

/// `POST /api/orders/{id}/payment`
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(body): Json<PaymentConfirmation>,
) -> Result<Json<Order>> {
    let order = service(&state)
        .confirm_payment(user.id, id, &body, &state.config().payment_gateway_secret)
        .await?;
    Ok(Json(order))
}
