//! Shopper profile reads and updates.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use maison_core::UserId;
use maison_core::address::validate_phone;

use crate::cache::ShopCache;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::models::User;

/// Longest display name accepted.
const MAX_NAME_LENGTH: usize = 100;

/// Body of `PATCH /api/users/me`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Trim fields and validate them.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for a blank or overlong name or an invalid phone.
    pub fn validated(&self) -> Result<(Option<String>, Option<String>)> {
        let name = match self.name.as_deref().map(str::trim) {
            Some("") => return Err(AppError::BadRequest("name cannot be empty".to_string())),
            Some(n) if n.chars().count() > MAX_NAME_LENGTH => {
                return Err(AppError::BadRequest(format!(
                    "name must be at most {MAX_NAME_LENGTH} characters"
                )));
            }
            other => other.map(String::from),
        };
        let phone = match self.phone.as_deref().map(str::trim) {
            Some(p) => {
                validate_phone(p).map_err(|e| AppError::BadRequest(e.to_string()))?;
                Some(p.to_string())
            }
            None => None,
        };
        Ok((name, phone))
    }
}

pub struct ProfileService<'a> {
    cache: &'a ShopCache,
    users: UserRepository<'a>,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a ShopCache) -> Self {
        Self {
            cache,
            users: UserRepository::new(pool),
        }
    }

    /// The user's profile, from cache when present.
    ///
    /// # Errors
    ///
    /// `NOT_FOUND` if the account no longer exists.
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Arc<User>> {
        if let Some(hit) = self.cache.profile(user_id).await {
            return Ok(hit);
        }
        let user = Arc::new(
            self.users
                .get_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("user not found".to_string()))?,
        );
        self.cache.put_profile(Arc::clone(&user)).await;
        Ok(user)
    }

    /// Update name and/or phone.
    ///
    /// # Errors
    ///
    /// `BAD_REQUEST` for invalid fields.
    #[instrument(skip(self, update))]
    pub async fn update(&self, user_id: UserId, update: &ProfileUpdate) -> Result<Arc<User>> {
        let (name, phone) = update.validated()?;
        let user = self
            .users
            .update_profile(user_id, name.as_deref(), phone.as_deref())
            .await?;
        self.cache.invalidate_profile(user_id).await;
        Ok(Arc::new(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_validation() {
        let update = ProfileUpdate {
            name: Some("  Asha  ".to_string()),
            phone: None,
        };
        assert_eq!(update.validated().unwrap(), (Some("Asha".to_string()), None));

        let blank = ProfileUpdate {
            name: Some("   ".to_string()),
            phone: None,
        };
        assert!(blank.validated().is_err());

        let bad_phone = ProfileUpdate {
            name: None,
            phone: Some("12".to_string()),
        };
        assert_eq!(bad_phone.validated().unwrap_err().code(), "BAD_REQUEST");
    }
}
