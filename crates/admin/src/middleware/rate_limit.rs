//! Login rate limiting using governor and `tower_governor`.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor using the client address reported by the reverse proxy.
///
/// Admin runs behind a single proxy, so only `x-real-ip` is trusted.
#[derive(Clone, Copy)]
pub struct RealIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for RealIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<RealIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for the login route: 1 token every 12 seconds, burst of 5.
///
/// # Panics
///
/// Never: `per_second(12)` and `burst_size(5)` are valid positive values.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(RealIpKeyExtractor)
        .per_second(12)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(12) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_real_ip_is_key() {
        let req = Request::builder()
            .header("x-real-ip", "203.0.113.7")
            .body(())
            .unwrap();
        assert_eq!(
            RealIpKeyExtractor.extract(&req).unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let req = Request::builder().body(()).unwrap();
        assert!(RealIpKeyExtractor.extract(&req).is_err());
    }
}
