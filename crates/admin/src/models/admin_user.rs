//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use maison_core::{AdminUserId, Email};

// Re-export AdminRole from core for convenience
pub use maison_core::AdminRole;

/// An admin user (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}
