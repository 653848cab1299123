//! Wishlist API handlers (`/api/wishlist/*`).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use maison_core::{ProductId, UserId, WishlistItemId};

use super::UserScope;
use crate::error::Result;
use crate::middleware::{RequireAuth, ensure_owner};
use crate::models::{CartSnapshot, WishlistSnapshot};
use crate::services::wishlist::{MoveToCart, WishlistService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub user_id: UserId,
    pub item_id: WishlistItemId,
}

#[derive(Debug, Serialize)]
pub struct MovedToCart {
    pub cart: Arc<CartSnapshot>,
    pub wishlist: Arc<WishlistSnapshot>,
}

fn service(state: &AppState) -> WishlistService<'_> {
    WishlistService::new(state.pool(), state.cache())
}

/// `GET /api/wishlist?user_id=`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(scope): Query<UserScope>,
) -> Result<Json<Arc<WishlistSnapshot>>> {
    ensure_owner(&user, scope.user_id)?;
    Ok(Json(service(&state).snapshot(scope.user_id).await?))
}

/// `POST /api/wishlist/add`
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddRequest>,
) -> Result<Json<Arc<WishlistSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    Ok(Json(service(&state).add(body.user_id, body.product_id).await?))
}

/// `POST /api/wishlist/remove`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<RemoveRequest>,
) -> Result<Json<Arc<WishlistSnapshot>>> {
    ensure_owner(&user, body.user_id)?;
    Ok(Json(service(&state).remove(body.user_id, body.item_id).await?))
}

/// `POST /api/wishlist/move-to-cart`
pub async fn move_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<MoveToCart>,
) -> Result<Json<MovedToCart>> {
    ensure_owner(&user, body.user_id)?;
    let (cart, wishlist) = service(&state).move_to_cart(&body).await?;
    Ok(Json(MovedToCart { cart, wishlist }))
}
