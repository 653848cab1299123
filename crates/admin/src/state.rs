//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::carrier::{CarrierClient, CarrierError};
use crate::config::AdminConfig;
use crate::services::reports::AnalyticsCache;
use crate::services::revalidate::Revalidator;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    carrier: CarrierClient,
    revalidator: Revalidator,
    analytics: AnalyticsCache,
}

impl AppState {
    /// Build state and the outbound HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Http` if an HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, CarrierError> {
        let carrier = CarrierClient::new(&config.carrier)?;
        let revalidator = Revalidator::new(&config.revalidate)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carrier,
                revalidator,
                analytics: AnalyticsCache::new(),
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the carrier tracking client.
    #[must_use]
    pub fn carrier(&self) -> &CarrierClient {
        &self.inner.carrier
    }

    /// Get a reference to the storefront revalidation client.
    #[must_use]
    pub fn revalidator(&self) -> &Revalidator {
        &self.inner.revalidator
    }

    /// Get a reference to the revenue report cache.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsCache {
        &self.inner.analytics
    }
}
