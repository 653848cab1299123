//! Profile handlers (`/api/users/me`).

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::profile::{ProfileService, ProfileUpdate};
use crate::state::AppState;

/// `GET /api/users/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Arc<User>>> {
    let profile = ProfileService::new(state.pool(), state.cache())
        .get(user.id)
        .await?;
    Ok(Json(profile))
}

/// `PATCH /api/users/me`
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<Arc<User>>> {
    let profile = ProfileService::new(state.pool(), state.cache())
        .update(user.id, &body)
        .await?;
    Ok(Json(profile))
}
