//! Payment timer: cancels orders left unpaid past the payment timeout.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::config::OrderTimerConfig;
use crate::db::{OrderRepository, RepositoryError};

/// Creation time before which a still-pending order is expired.
#[must_use]
pub fn expiry_cutoff(now: DateTime<Utc>, config: &OrderTimerConfig) -> DateTime<Utc> {
    let timeout = chrono::Duration::from_std(config.payment_timeout)
        .unwrap_or_else(|_| chrono::Duration::minutes(30));
    now - timeout
}

/// Run one sweep. Returns how many orders were cancelled.
///
/// # Errors
///
/// Returns `RepositoryError` if the update fails.
pub async fn sweep_once(
    pool: &PgPool,
    config: &OrderTimerConfig,
    now: DateTime<Utc>,
) -> Result<u64, RepositoryError> {
    OrderRepository::new(pool)
        .expire_pending(expiry_cutoff(now, config))
        .await
}

/// Sweep on a fixed interval until the task is dropped.
pub async fn run(pool: PgPool, config: OrderTimerConfig) {
    let mut ticker = interval(config.sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        timeout_secs = config.payment_timeout.as_secs(),
        interval_secs = config.sweep_interval.as_secs(),
        "Payment timer started"
    );

    loop {
        ticker.tick().await;
        match sweep_once(&pool, &config, Utc::now()).await {
            Ok(0) => {}
            Ok(count) => info!(count, "Cancelled unpaid orders"),
            Err(e) => error!(error = %e, "Payment timer sweep failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_cutoff_subtracts_timeout() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let config = OrderTimerConfig {
            payment_timeout: Duration::from_secs(45 * 60),
            sweep_interval: Duration::from_secs(60),
        };
        assert_eq!(
            expiry_cutoff(now, &config),
            Utc.with_ymd_and_hms(2026, 10, 18, 11, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_default_timeout_is_thirty_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let cutoff = expiry_cutoff(now, &OrderTimerConfig::default());
        assert_eq!(now - cutoff, chrono::Duration::minutes(30));
    }
}
