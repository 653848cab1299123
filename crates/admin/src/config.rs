//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the admin API
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `CRON_SECRET` - Bearer token for `/cron/*`
//! - `CARRIER_BASE_URL` - Carrier tracking API root
//! - `CARRIER_API_KEY` - Carrier API token
//! - `STOREFRONT_REVALIDATE_URL` - Storefront `/internal/revalidate` endpoint
//! - `REVALIDATE_SECRET` - Bearer token shared with the storefront
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `SHIPMENT_POLL_INTERVAL_SECS` - Run the carrier poll in-process (disabled when unset)
//! - `MEDIA_DIR` - Upload directory (default: ./media)
//! - `LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use maison_core::env::{self, ConfigError};

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Bearer secret for scheduled jobs
    pub cron_secret: SecretString,
    /// Carrier tracking API
    pub carrier: CarrierConfig,
    /// Storefront cache revalidation
    pub revalidate: RevalidateConfig,
    /// In-process carrier poll interval; `None` leaves polling to `/cron`
    pub shipment_poll_interval: Option<Duration>,
    /// Where uploaded media files are written
    pub media_dir: PathBuf,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Carrier tracking API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct CarrierConfig {
    /// API root, without trailing slash
    pub base_url: Url,
    /// Token sent as `Authorization: Token <key>`
    pub api_key: SecretString,
}

impl std::fmt::Debug for CarrierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Storefront revalidation endpoint and its shared secret.
#[derive(Clone)]
pub struct RevalidateConfig {
    pub url: Url,
    pub secret: SecretString,
}

impl std::fmt::Debug for RevalidateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevalidateConfig")
            .field("url", &self.url.as_str())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
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

        let database_url = env::database_url("ADMIN_DATABASE_URL")?;
        let host = env::parse_or("ADMIN_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = env::parse_or("ADMIN_PORT", 3001_u16)?;
        let base_url = http_url("ADMIN_BASE_URL", &env::required("ADMIN_BASE_URL")?)?;
        let session_secret = env::session_secret("ADMIN_SESSION_SECRET")?;
        let cron_secret = env::validated_secret("CRON_SECRET")?;

        let carrier = CarrierConfig {
            base_url: http_url("CARRIER_BASE_URL", &env::required("CARRIER_BASE_URL")?)?,
            api_key: SecretString::from(env::required("CARRIER_API_KEY")?),
        };
        let revalidate = RevalidateConfig {
            url: http_url(
                "STOREFRONT_REVALIDATE_URL",
                &env::required("STOREFRONT_REVALIDATE_URL")?,
            )?,
            secret: env::validated_secret("REVALIDATE_SECRET")?,
        };

        let shipment_poll_interval = env::parse_optional::<u64>("SHIPMENT_POLL_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            database_url,
            host,
            port,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session_secret,
            cron_secret,
            carrier,
            revalidate,
            shipment_poll_interval,
            media_dir: PathBuf::from(env::or_default("MEDIA_DIR", "./media")),
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

fn http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_url_rejects_other_schemes() {
        assert!(http_url("X", "ftp://carrier.test").is_err());
        assert!(http_url("X", "not a url").is_err());
        assert!(http_url("X", "https://carrier.test/api").is_ok());
    }

    #[test]
    fn test_carrier_config_debug_redacts_secrets() {
        let config = CarrierConfig {
            base_url: Url::parse("https://track.carrier.test").unwrap(),
            api_key: SecretString::from("carrier_live_9f8e7d6c5b4a"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("track.carrier.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("carrier_live_9f8e7d6c5b4a"));
    }

    #[test]
    fn test_revalidate_config_debug_redacts_secrets() {
        let config = RevalidateConfig {
            url: Url::parse("http://localhost:3000/internal/revalidate").unwrap(),
            secret: SecretString::from("rv-Q7w!p2Lz9#kd"),
        };
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("rv-Q7w!p2Lz9#kd"));
    }
}
