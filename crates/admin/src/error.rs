//! Unified error handling for admin.
//!
//! Errors render as `{"code": "...", "message": "..."}`. A rejected CSV
//! import additionally carries its per-row problems under `errors`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::carrier::CarrierError;
use crate::db::RepositoryError;
use crate::models::{RowError, ShipmentRuleError, UploadError};
use crate::services::auth::AuthError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login or account creation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Carrier API call failed.
    #[error("Carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An uploaded file failed row-level validation.
    #[error("Invalid file: {} problem(s)", .0.len())]
    Invalid(Vec<RowError>),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<RowError>>,
}

impl AppError {
    /// Stable machine-readable code for the response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => "NOT_FOUND",
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => "CONFLICT",
            Self::Database(_) | Self::Internal(_) => "INTERNAL",
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "UNAUTHORIZED",
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => "BAD_REQUEST",
                AuthError::AlreadyExists => "CONFLICT",
                AuthError::Repository(_) | AuthError::PasswordHash => "INTERNAL",
            },
            Self::Carrier(_) => "BAD_GATEWAY",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) | Self::Invalid(_) => "BAD_REQUEST",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.code() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            "BAD_GATEWAY" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password".to_string(),
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => {
                "Internal server error".to_string()
            }
            Self::Auth(err) => err.to_string(),
            Self::Carrier(_) => "Carrier service error".to_string(),
            Self::Invalid(rows) => format!("file has {} invalid row(s)", rows.len()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let body = ErrorBody {
            code: self.code(),
            message: self.client_message(),
            errors: match self {
                Self::Invalid(rows) => Some(rows),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ShipmentRuleError> for AppError {
    fn from(err: ShipmentRuleError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<maison_core::coupon::CouponError> for AppError {
    fn from(err: maison_core::coupon::CouponError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("coupon 12".to_string());
        assert_eq!(err.to_string(), "Not found: coupon 12");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::Carrier(CarrierError::Decode("eof".into()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Database(RepositoryError::Conflict("dup".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_import_is_bad_request() {
        let err = AppError::Invalid(vec![RowError {
            row: 3,
            message: "price must be a number".to_string(),
        }]);
        assert_eq!(err.code(), "BAD_REQUEST");
        assert_eq!(err.client_message(), "file has 1 invalid row(s)");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("connection refused at 10.0.0.3".to_string());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_rule_errors_map() {
        assert_eq!(AppError::from(ShipmentRuleError::NotPaid).code(), "CONFLICT");
        assert_eq!(AppError::from(UploadError::TooLarge).code(), "BAD_REQUEST");
    }
}
