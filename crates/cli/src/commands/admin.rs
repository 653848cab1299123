//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! MAISON_ADMIN_PASSWORD='...' maison-cli admin create -e ops@maison.shop -n "Ops" -r super_admin
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//! - `MAISON_ADMIN_PASSWORD` - initial password (at least 12 characters)
//!
//! The password is taken from the environment so it never lands in shell
//! history.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use maison_admin::db;
use maison_admin::services::auth::{AdminAuthService, AuthError};
use maison_core::AdminRole;
use maison_core::env::{self, ConfigError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Validation or insert failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Parse a role name given on the command line.
fn parse_role(raw: &str) -> Result<AdminRole, AdminError> {
    raw.trim()
        .parse()
        .map_err(|_| AdminError::InvalidRole(raw.to_owned()))
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error for an unknown role, a missing password or database
/// URL, an invalid email, a short password, or a taken email.
pub async fn create_user(email: &str, name: &str, role: &str) -> Result<(), AdminError> {
    env::load_dotenv();

    let role = parse_role(role)?;
    let password = SecretString::from(env::required("MAISON_ADMIN_PASSWORD")?);
    let database_url = env::database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url).await?;

    let user = AdminAuthService::new(&pool)
        .create_admin(email, name, role, password.expose_secret())
        .await?;

    tracing::info!(
        "Admin user created. ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_accepts_known_roles() {
        assert_eq!(parse_role("super_admin").unwrap(), AdminRole::SuperAdmin);
        assert_eq!(parse_role(" viewer ").unwrap(), AdminRole::Viewer);
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        assert!(matches!(parse_role("owner"), Err(AdminError::InvalidRole(r)) if r == "owner"));
    }
}
