//! Media library: files on disk, metadata in `admin.media`.

use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use maison_core::AdminUserId;

use crate::db::MediaRepository;
use crate::db::media::NewMedia;
use crate::error::{AppError, Result};
use crate::models::media::{check_upload, display_name};
use crate::models::MediaAsset;

/// An upload as received from the multipart form.
#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub alt_text: Option<String>,
}

pub struct MediaService<'a> {
    media: MediaRepository<'a>,
    media_dir: &'a Path,
}

impl<'a> MediaService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, media_dir: &'a Path) -> Self {
        Self {
            media: MediaRepository::new(pool),
            media_dir,
        }
    }

    fn path_of(&self, storage_path: &str) -> PathBuf {
        self.media_dir.join(storage_path)
    }

    /// Store an image and record it.
    ///
    /// The file is written before the row; if the insert fails the file is
    /// removed again.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for a non-image or oversized upload; `INTERNAL` if the
    /// file cannot be written.
    #[instrument(skip(self, upload), fields(content_type = %upload.content_type, bytes = upload.bytes.len()))]
    pub async fn upload(&self, upload: Upload, uploaded_by: AdminUserId) -> Result<MediaAsset> {
        let extension = check_upload(&upload.content_type, upload.bytes.len())?;
        let id = Uuid::new_v4();
        let storage_path = format!("{id}.{extension}");
        let path = self.path_of(&storage_path);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("writing {}: {e}", path.display())))?;

        let file_name = display_name(upload.file_name.as_deref());
        let alt_text = upload
            .alt_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let inserted = self
            .media
            .insert(&NewMedia {
                id,
                file_name: &file_name,
                content_type: &upload.content_type,
                byte_size: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
                storage_path: &storage_path,
                alt_text,
                uploaded_by,
            })
            .await;

        match inserted {
            Ok(asset) => {
                info!(media_id = %asset.id, "Media uploaded");
                Ok(asset)
            }
            Err(e) => {
                if let Err(io) = tokio::fs::remove_file(&path).await {
                    warn!(error = %io, path = %path.display(), "Could not remove orphaned upload");
                }
                Err(e.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<MediaAsset>> {
        Ok(self.media.list().await?)
    }

    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown id.
    pub async fn get(&self, id: Uuid) -> Result<MediaAsset> {
        self.media
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("media {id} not found")))
    }

    /// Delete the row, then the file. A file already gone is not an error.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let asset = self.media.delete(id).await?;
        let path = self.path_of(&asset.storage_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Media file was already missing");
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Could not remove media file");
            }
        }
        info!(media_id = %id, "Media deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// `NOT_FOUND` for an unknown id; `BAD_REQUEST` for alt text over 500
    /// characters.
    pub async fn set_alt_text(&self, id: Uuid, alt_text: Option<&str>) -> Result<MediaAsset> {
        let alt_text = alt_text.map(str::trim).filter(|s| !s.is_empty());
        if alt_text.is_some_and(|s| s.chars().count() > 500) {
            return Err(AppError::BadRequest(
                "alt_text must be at most 500 characters".to_string(),
            ));
        }
        Ok(self.media.set_alt_text(id, alt_text).await?)
    }
}
