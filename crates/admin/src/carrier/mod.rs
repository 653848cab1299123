//! Carrier tracking API client.
//!
//! The carrier exposes one read endpoint, `GET {base}/track/{tracking_number}`,
//! authenticated with `Authorization: Token <api key>`. Responses are JSON
//! objects carrying at least a free-text `current_status` scan label; the
//! whole object is kept as the shipment's last payload.

pub mod client;

pub use client::{CarrierClient, TrackingResponse};

use thiserror::Error;

/// Errors that can occur when calling the carrier.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// Request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Carrier answered with a non-success status.
    #[error("carrier returned {status} for {tracking_number}")]
    Status {
        status: reqwest::StatusCode,
        tracking_number: String,
    },

    /// Response body was not the JSON shape we expect.
    #[error("unparseable carrier response: {0}")]
    Decode(String),

    /// Base URL could not be combined with the tracking path.
    #[error("invalid carrier URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CarrierError {
    /// Whether this failure concerns one shipment only.
    ///
    /// Transport failures skip the shipment; a response we cannot read
    /// aborts the whole poll.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
