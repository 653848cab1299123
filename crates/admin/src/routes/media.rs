//! Media library route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireWriter};
use crate::models::{MediaAsset, MediaPatch};
use crate::services::media::{MediaService, Upload};
use crate::state::AppState;

fn service(state: &AppState) -> MediaService<'_> {
    MediaService::new(state.pool(), &state.config().media_dir)
}

fn malformed(e: &axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("malformed upload: {e}"))
}

/// `GET /api/media`
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
) -> Result<Json<Vec<MediaAsset>>> {
    Ok(Json(service(&state).list().await?))
}

/// `GET /api/media/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(_): RequireAdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaAsset>> {
    Ok(Json(service(&state).get(id).await?))
}

/// `POST /api/media` (multipart fields `file` and optional `alt_text`)
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaAsset>)> {
    let mut file = None;
    let mut alt_text = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| malformed(&e))? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(String::from);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| malformed(&e))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("alt_text") => {
                alt_text = Some(field.text().await.map_err(|e| malformed(&e))?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("missing 'file' field".to_string()))?;
    let asset = service(&state)
        .upload(
            Upload {
                file_name,
                content_type,
                bytes,
                alt_text,
            },
            admin.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// `PATCH /api/media/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<Uuid>,
    Json(patch): Json<MediaPatch>,
) -> Result<Json<MediaAsset>> {
    let asset = service(&state)
        .set_alt_text(id, patch.alt_text.as_deref())
        .await?;
    Ok(Json(asset))
}

/// `DELETE /api/media/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
