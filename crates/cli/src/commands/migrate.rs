//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! maison-cli migrate storefront
//! maison-cli migrate admin
//! maison-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront connection string
//! - `ADMIN_DATABASE_URL` - admin connection string
//! - `DATABASE_URL` - fallback for either
//!
//! Both sets may target one database. They share the `_sqlx_migrations`
//! table, so each run ignores applied versions that belong to the other set.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use thiserror::Error;

use maison_core::env::{self, ConfigError};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

async fn apply(label: &str, url_key: &str, mut migrator: Migrator) -> Result<(), MigrationError> {
    env::load_dotenv();
    let database_url = env::database_url(url_key)?;

    tracing::info!("Connecting to {label} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!(
        count = migrator.iter().count(),
        "Running {label} migrations..."
    );
    migrator.set_ignore_missing(true).run(&pool).await?;

    tracing::info!("{label} migrations complete");
    Ok(())
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable,
/// or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    apply(
        "storefront",
        "STOREFRONT_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations"),
    )
    .await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the database is unreachable,
/// or a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    apply(
        "admin",
        "ADMIN_DATABASE_URL",
        sqlx::migrate!("../admin/migrations"),
    )
    .await
}
