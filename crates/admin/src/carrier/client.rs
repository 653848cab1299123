//! HTTP client for the carrier tracking endpoint.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::CarrierError;
use crate::config::CarrierConfig;

/// One tracking lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingResponse {
    /// Raw response body, persisted as the shipment's last payload.
    pub raw: Value,
    /// The carrier's scan label, e.g. `"Out For Delivery"`.
    pub status: String,
}

impl TrackingResponse {
    /// Read a response body.
    ///
    /// # Errors
    ///
    /// `CarrierError::Decode` if the body is not JSON or has no string
    /// `current_status`.
    pub fn from_body(body: &str) -> Result<Self, CarrierError> {
        let raw: Value =
            serde_json::from_str(body).map_err(|e| CarrierError::Decode(e.to_string()))?;
        let status = raw
            .get("current_status")
            .and_then(Value::as_str)
            .ok_or_else(|| CarrierError::Decode("missing current_status".to_string()))?
            .to_string();
        Ok(Self { raw, status })
    }
}

/// Carrier tracking API client.
#[derive(Clone)]
pub struct CarrierClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for CarrierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl CarrierClient {
    /// Create a client for the configured carrier.
    ///
    /// # Errors
    ///
    /// Returns `CarrierError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CarrierConfig) -> Result<Self, CarrierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        // `Url::join` replaces the last segment unless the path ends in '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Look up the current status of a shipment.
    ///
    /// # Errors
    ///
    /// `Http` or `Status` when the request fails, `Decode` when the body
    /// cannot be read.
    #[instrument(skip(self))]
    pub async fn track(&self, tracking_number: &str) -> Result<TrackingResponse, CarrierError> {
        let url = self.base_url.join(&format!("track/{tracking_number}"))?;

        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.api_key.expose_secret()),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CarrierError::Status {
                status,
                tracking_number: tracking_number.to_string(),
            });
        }

        let body = response.text().await?;
        TrackingResponse::from_body(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, suffix: &str) -> CarrierClient {
        CarrierClient::new(&CarrierConfig {
            base_url: Url::parse(&format!("{}{suffix}", server.uri())).unwrap(),
            api_key: SecretString::from("test-key"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_track_reads_status_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/track/AWB123"))
            .and(header("authorization", "Token test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "awb": "AWB123",
                "current_status": "Out For Delivery",
                "scans": [{"location": "Pune"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tracking = client_for(&server, "/v1").track("AWB123").await.unwrap();
        assert_eq!(tracking.status, "Out For Delivery");
        assert_eq!(tracking.raw["scans"][0]["location"], "Pune");
    }

    #[tokio::test]
    async fn test_error_status_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/track/MISSING"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, "").track("MISSING").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/track/AWB9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server, "/").track("AWB9").await.unwrap_err();
        assert!(matches!(err, CarrierError::Decode(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_missing_status_field() {
        let err = TrackingResponse::from_body(r#"{"awb": "X"}"#).unwrap_err();
        assert!(matches!(err, CarrierError::Decode(_)));
    }
}
