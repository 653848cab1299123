//! Cart API handlers (`/api/cart/*`).
//!
//! Every request names the `user_id` it acts on; it must match the session.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use maison_core::{CartItemId, CartItemStatus, UserId};

use super::UserScope;
use crate::error::Result;
use crate::middleware::{RequireAuth, ensure_owner};
use crate::models::{CartSnapshot, WishlistSnapshot};
use crate::services::cart::{AddToCart, CartService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub user_id: UserId,
    pub item_id: CartItemId,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub user_id: UserId,
    pub item_id: CartItemId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub user_id: UserId,
    pub item_id: CartItemId,
    pub status: CartItemStatus,
}

#[derive(Debug, Deserialize)]
pub struct RemoveManyRequest {
    pub user_id: UserId,
    pub item_ids: Vec<CartItemId>,
}

#[derive(Debug, Serialize)]
pub struct MovedToWishlist {
    pub cart: Arc<CartSnapshot>,
    pub wishlist: Arc<WishlistSnapshot>,
}

fn service(state: &AppState) -> CartService<'_> {
    CartService::new(state.pool(), state.cache())
}

/// `GET /api/cart?user_id=`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(scope): Query<UserScope>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, scope.user_id)?;
    Ok(Json(service(&state).snapshot(scope.user_id).await?))
}

/// `POST /api/cart/add`
#[instrument(skip_all, fields(user_id = %body.user_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddToCart>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    Ok(Json(service(&state).add(&body).await?))
}

/// `POST /api/cart/update-quantity`
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<QuantityRequest>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    let cart = service(&state)
        .update_quantity(body.user_id, body.item_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

/// `POST /api/cart/set-status`
pub async fn set_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    let cart = service(&state)
        .set_status(body.user_id, body.item_id, body.status)
        .await?;
    Ok(Json(cart))
}

/// `POST /api/cart/remove`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ItemRequest>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    Ok(Json(service(&state).remove(body.user_id, body.item_id).await?))
}

/// `POST /api/cart/remove-many`
pub async fn remove_many(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<RemoveManyRequest>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    let cart = service(&state)
        .remove_many(body.user_id, &body.item_ids)
        .await?;
    Ok(Json(cart))
}

/// `POST /api/cart/clear`
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<UserScope>,
) -> Result<Json<Arc<CartSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    Ok(Json(service(&state).clear(body.user_id).await?))
}

/// `POST /api/cart/move-to-wishlist`
pub async fn move_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ItemRequest>,
) -> Result<Json<MovedToWishlist>> {
    ensure_owner(&user, body.user_id)?;
    let (cart, wishlist) = service(&state)
        .move_to_wishlist(body.user_id, body.item_id)
        .await?;
    Ok(Json(MovedToWishlist { cart, wishlist }))
}
