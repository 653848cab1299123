//! Media library types and upload rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use maison_core::AdminUserId;

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted image content types and the extension stored files get.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/avif", "avif"),
];

/// A file in the media library.
#[derive(Debug, Clone, Serialize)]
pub struct MediaAsset {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub byte_size: i64,
    /// Path relative to the media directory.
    pub storage_path: String,
    pub alt_text: Option<String>,
    pub uploaded_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
}

/// Body of `PATCH /api/media/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaPatch {
    pub alt_text: Option<String>,
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("only image uploads are accepted (got {0})")]
    UnsupportedType(String),
    #[error("file is empty")]
    Empty,
    #[error("file exceeds the 10 MiB limit")]
    TooLarge,
}

/// Check an upload and return the extension to store it under.
///
/// # Errors
///
/// Returns `UploadError` for non-image content or a size outside
/// `1..=MAX_UPLOAD_BYTES`.
pub fn check_upload(content_type: &str, len: usize) -> Result<&'static str, UploadError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let ext = IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
    if len == 0 {
        return Err(UploadError::Empty);
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(ext)
}

/// Reduce a client-supplied file name to its last path segment.
#[must_use]
pub fn display_name(raw: Option<&str>) -> String {
    raw.and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| "upload".to_string(), |name| name.chars().take(255).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_accepted() {
        assert_eq!(check_upload("image/png", 1024), Ok("png"));
        assert_eq!(check_upload("IMAGE/JPEG; charset=binary", 10), Ok("jpg"));
    }

    #[test]
    fn test_non_images_rejected() {
        assert!(matches!(
            check_upload("application/pdf", 10),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            check_upload("image/svg+xml", 10),
            Err(UploadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_size_limits() {
        assert_eq!(check_upload("image/webp", 0), Err(UploadError::Empty));
        assert_eq!(check_upload("image/webp", MAX_UPLOAD_BYTES), Ok("webp"));
        assert_eq!(
            check_upload("image/webp", MAX_UPLOAD_BYTES + 1),
            Err(UploadError::TooLarge)
        );
    }

    #[test]
    fn test_display_name_strips_directories() {
        assert_eq!(display_name(Some("../../etc/lookbook.png")), "lookbook.png");
        assert_eq!(display_name(Some("C:\\photos\\hero.jpg")), "hero.jpg");
        assert_eq!(display_name(Some("  ")), "upload");
        assert_eq!(display_name(None), "upload");
    }
}
