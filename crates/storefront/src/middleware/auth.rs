//! Authentication extractor and ownership guard.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use maison_core::UserId;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in shopper.
///
/// Rejects with `401 UNAUTHORIZED` when the session carries no user.
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))?;

        Ok(Self(user))
    }
}

/// Reject requests whose payload names a different user than the session.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when `claimed` is not the session user.
pub fn ensure_owner(session_user: &CurrentUser, claimed: UserId) -> Result<(), AppError> {
    if session_user.id == claimed {
        Ok(())
    } else {
        tracing::warn!(
            session_user = %session_user.id,
            claimed_user = %claimed,
            "Rejected cross-user mutation"
        );
        Err(AppError::Forbidden(
            "cannot modify another user's data".to_string(),
        ))
    }
}

/// Store the current user in the session.
///
/// Cycles the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the current user and flush the session.
///
/// # Errors
///
/// Returns an error if the session cannot be cleared.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maison_core::Email;

    use super::*;

    fn user(id: i32) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse("shopper@example.com").unwrap(),
        }
    }

    #[test]
    fn test_owner_passes() {
        assert!(ensure_owner(&user(1), UserId::new(1)).is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let err = ensure_owner(&user(1), UserId::new(2)).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }
}
