//! Media library rows. File bytes live on disk under the media directory.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use maison_core::AdminUserId;

use super::RepositoryError;
use crate::models::MediaAsset;

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    file_name: String,
    content_type: String,
    byte_size: i64,
    storage_path: String,
    alt_text: Option<String>,
    uploaded_by: Option<AdminUserId>,
    created_at: DateTime<Utc>,
}

impl From<MediaRow> for MediaAsset {
    fn from(row: MediaRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            content_type: row.content_type,
            byte_size: row.byte_size,
            storage_path: row.storage_path,
            alt_text: row.alt_text,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str =
    "id, file_name, content_type, byte_size, storage_path, alt_text, uploaded_by, created_at";

/// Fields of a freshly stored upload.
#[derive(Debug)]
pub struct NewMedia<'a> {
    pub id: Uuid,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub byte_size: i64,
    pub storage_path: &'a str,
    pub alt_text: Option<&'a str>,
    pub uploaded_by: AdminUserId,
}

pub struct MediaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MediaRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, media: &NewMedia<'_>) -> Result<MediaAsset, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "INSERT INTO admin.media
                (id, file_name, content_type, byte_size, storage_path, alt_text, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(media.id)
        .bind(media.file_name)
        .bind(media.content_type)
        .bind(media.byte_size)
        .bind(media.storage_path)
        .bind(media.alt_text)
        .bind(media.uploaded_by)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<MediaAsset>, RepositoryError> {
        let rows = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {COLUMNS} FROM admin.media ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaAsset>, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "SELECT {COLUMNS} FROM admin.media WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Delete a row and return it so the caller can remove the file.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn delete(&self, id: Uuid) -> Result<MediaAsset, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "DELETE FROM admin.media WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn set_alt_text(
        &self,
        id: Uuid,
        alt_text: Option<&str>,
    ) -> Result<MediaAsset, RepositoryError> {
        let row = sqlx::query_as::<_, MediaRow>(&format!(
            "UPDATE admin.media SET alt_text = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(alt_text)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
