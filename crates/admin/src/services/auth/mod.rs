//! Admin authentication service.
//!
//! Email and password login with Argon2id hashes stored on
//! `admin.admin_user`. Accounts are created from the CLI, never over HTTP.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use maison_core::Email;

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::admin_user::{AdminRole, AdminUser};

/// Minimum admin password length. Longer than the shopper minimum.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Longest password accepted; bounds hashing cost.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check an email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_with_password(&email).await? else {
            warn!("Admin login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        info!(admin_id = %user.id, "Admin logged in");
        Ok(user)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// `InvalidEmail`, `WeakPassword`, or `AlreadyExists` for a taken email.
    #[instrument(skip(self, email, password))]
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        role: AdminRole,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let name = name.trim();
        let name = if name.is_empty() { email.local_part() } else { name };

        self.users
            .create(&email, name, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is malformed or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("a long admin passphrase").unwrap();
        assert!(verify_password("a long admin passphrase", &hash).is_ok());
        assert!(matches!(
            verify_password("another passphrase", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_admin_password_policy_is_stricter() {
        assert!(matches!(
            validate_password("eleven char"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("twelve chars").is_ok());
    }
}
