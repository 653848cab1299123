//! Address book handlers (`/api/addresses/*`).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use maison_core::AddressId;

use super::UserScope;
use crate::error::Result;
use crate::middleware::{RequireAuth, ensure_owner};
use crate::models::{Address, AddressInput};
use crate::services::addresses::AddressService;
use crate::state::AppState;

/// An address payload together with the user it is for.
#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    #[serde(flatten)]
    pub scope: UserScope,
    #[serde(flatten)]
    pub address: AddressInput,
}

/// `GET /api/addresses?user_id=`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(scope): Query<UserScope>,
) -> Result<Json<Vec<Address>>> {
    ensure_owner(&user, scope.user_id)?;
    Ok(Json(AddressService::new(state.pool()).list(scope.user_id).await?))
}

/// `POST /api/addresses`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    ensure_owner(&user, body.scope.user_id)?;
    let address = AddressService::new(state.pool())
        .create(body.scope.user_id, &body.address)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<Json<Address>> {
    ensure_owner(&user, body.scope.user_id)?;
    let address = AddressService::new(state.pool())
        .update(body.scope.user_id, id, &body.address)
        .await?;
    Ok(Json(address))
}

/// `POST /api/addresses/{id}/primary`
pub async fn set_primary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Json(scope): Json<UserScope>,
) -> Result<Json<Vec<Address>>> {
    ensure_owner(&user, scope.user_id)?;
    let addresses = AddressService::new(state.pool())
        .set_primary(scope.user_id, id)
        .await?;
    Ok(Json(addresses))
}

/// `DELETE /api/addresses/{id}?user_id=`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Query(scope): Query<UserScope>,
) -> Result<StatusCode> {
    ensure_owner(&user, scope.user_id)?;
    AddressService::new(state.pool())
        .delete(scope.user_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
