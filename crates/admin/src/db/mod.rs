//! Database operations for admin.
//!
//! # Schemas
//!
//! - `admin.admin_user`, `admin.session` - Admin accounts and sessions
//! - `admin.section_*` - One soft-deletable membership table per product feature
//! - `admin.media` - Media library
//! - `shop.*` - Catalog, coupons, orders and shipments (shared with the storefront)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run after the
//! storefront ones via:
//! ```bash
//! cargo run -p maison-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod coupons;
pub mod media;
pub mod orders;
pub mod products;
pub mod reports;
pub mod sections;
pub mod shipments;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use coupons::CouponRepository;
pub use media::MediaRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reports::ReportRepository;
pub use sections::SectionRepository;
pub use shipments::ShipmentRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
