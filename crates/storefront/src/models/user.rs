//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use maison_core::{Email, UserId};

/// A storefront customer. Serialized as the `/api/users/me` profile.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
