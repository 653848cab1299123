//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `PAYMENT_GATEWAY_SECRET` - Key for payment confirmation signatures
//! - `REVALIDATE_SECRET` - Bearer token the admin uses for cache revalidation
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `ORDER_PAYMENT_TIMEOUT_MINUTES` - Unpaid order lifetime (default: 30)
//! - `ORDER_SWEEP_INTERVAL_SECS` - Payment timer interval (default: 60)
//! - `LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;

use maison_core::env::{self, ConfigError};

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Payment gateway signing key
    pub payment_gateway_secret: SecretString,
    /// Shared bearer secret for `/internal/revalidate`
    pub revalidate_secret: SecretString,
    /// Payment timer settings
    pub orders: OrderTimerConfig,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Settings for the unpaid-order cancellation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTimerConfig {
    /// How long an order may stay `pending` before it is cancelled.
    pub payment_timeout: Duration,
    /// How often the loop runs.
    pub sweep_interval: Duration,
}

impl Default for OrderTimerConfig {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        env::load_dotenv();

        let database_url = env::database_url("STOREFRONT_DATABASE_URL")?;
        let host = env::parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env::parse_or("STOREFRONT_PORT", 3000_u16)?;
        let base_url = validate_base_url("STOREFRONT_BASE_URL", &env::required("STOREFRONT_BASE_URL")?)?;
        let session_secret = env::session_secret("STOREFRONT_SESSION_SECRET")?;
        let payment_gateway_secret = env::validated_secret("PAYMENT_GATEWAY_SECRET")?;
        let revalidate_secret = env::validated_secret("REVALIDATE_SECRET")?;

        let orders = OrderTimerConfig {
            payment_timeout: Duration::from_secs(
                env::parse_or("ORDER_PAYMENT_TIMEOUT_MINUTES", 30_u64)?.saturating_mul(60),
            ),
            sweep_interval: Duration::from_secs(
                env::parse_or("ORDER_SWEEP_INTERVAL_SECS", 60_u64)?.max(1),
            ),
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            payment_gateway_secret,
            revalidate_secret,
            orders,
            json_logs: env::optional("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            sentry_dsn: env::optional("SENTRY_DSN"),
            sentry_environment: env::optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env::parse_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: env::parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.1_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Parse a base URL and return it without a trailing slash.
fn validate_base_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            payment_gateway_secret: SecretString::from("gateway"),
            revalidate_secret: SecretString::from("revalidate"),
            orders: OrderTimerConfig::default(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut cfg = config();
        cfg.payment_gateway_secret = SecretString::from("super_secret_gateway_key");
        let debug_output = format!("{cfg:?}");
        assert!(!debug_output.contains("super_secret_gateway_key"));
        assert!(debug_output.contains("localhost:3000"));
    }

    #[test]
    fn test_is_secure() {
        let mut cfg = config();
        assert!(!cfg.is_secure());
        cfg.base_url = "https://maison.shop".to_string();
        assert!(cfg.is_secure());
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("K", "https://maison.shop/").unwrap(),
            "https://maison.shop"
        );
        assert!(validate_base_url("K", "not a url").is_err());
        assert!(validate_base_url("K", "ftp://maison.shop").is_err());
    }

    #[test]
    fn test_order_timer_defaults() {
        let timer = OrderTimerConfig::default();
        assert_eq!(timer.payment_timeout, Duration::from_secs(1800));
        assert_eq!(timer.sweep_interval, Duration::from_secs(60));
    }
}
