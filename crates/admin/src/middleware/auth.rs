//! Authentication extractors for admin.
//!
//! Every admin role may read. Mutations additionally require a role that
//! can write, so `viewer` accounts get `403 FORBIDDEN` on them.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in admin of any role.
///
/// ```rust,ignore
/// async fn handler(RequireAdminAuth(admin): RequireAdminAuth) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))?;

        Ok(Self(admin))
    }
}

/// Extractor that requires an admin whose role may modify data.
pub struct RequireWriter(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireWriter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        ensure_writer(&admin)?;
        Ok(Self(admin))
    }
}

/// # Errors
///
/// Returns `AppError::Forbidden` for read-only roles.
pub fn ensure_writer(admin: &CurrentAdmin) -> Result<(), AppError> {
    if admin.role.can_write() {
        Ok(())
    } else {
        tracing::warn!(admin_id = %admin.id, role = %admin.role, "Read-only admin attempted a write");
        Err(AppError::Forbidden(format!(
            "role '{}' cannot modify data",
            admin.role
        )))
    }
}

/// Store the current admin in the session, cycling the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Remove the current admin and flush the session.
///
/// # Errors
///
/// Returns an error if the session cannot be cleared.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maison_core::{AdminRole, AdminUserId, Email};

    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(7),
            email: Email::parse("ops@maison.test").unwrap(),
            name: "Ops".to_string(),
            role,
        }
    }

    #[test]
    fn test_writers_pass() {
        assert!(ensure_writer(&admin(AdminRole::SuperAdmin)).is_ok());
        assert!(ensure_writer(&admin(AdminRole::Admin)).is_ok());
    }

    #[test]
    fn test_viewer_is_forbidden() {
        let err = ensure_writer(&admin(AdminRole::Viewer)).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
