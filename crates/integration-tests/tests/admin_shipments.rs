//! Shipment tracking: carrier lookups feeding the status planner, and the
//! shipment eligibility rules.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maison_admin::carrier::{CarrierClient, CarrierError};
use maison_admin::config::CarrierConfig;
use maison_admin::error::AppError;
use maison_admin::models::NewShipment;
use maison_admin::models::order::check_shippable;
use maison_admin::services::shipment_poll::plan_update;
use maison_core::{FulfillmentStatus, PaymentStatus, ShipmentStatus};

fn carrier(server: &MockServer) -> CarrierClient {
    CarrierClient::new(&CarrierConfig {
        base_url: Url::parse(&format!("{}/api/v2", server.uri())).unwrap(),
        api_key: SecretString::from("integration-key"),
    })
    .unwrap()
}

async fn stub_scan(server: &MockServer, awb: &str, label: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/track/{awb}")))
        .and(header("authorization", "Token integration-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "awb": awb, "current_status": label })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_delivery_scan_cascades_to_order() {
    let server = MockServer::start().await;
    stub_scan(&server, "AWB100", "  DELIVERED ").await;

    let tracking = carrier(&server).track("AWB100").await.unwrap();
    let (status, cascade) = plan_update(ShipmentStatus::OutForDelivery, &tracking.status);

    assert_eq!(status, Some(ShipmentStatus::Delivered));
    assert_eq!(cascade, Some(FulfillmentStatus::Delivered));
    assert_eq!(tracking.raw["awb"], "AWB100");
}

#[tokio::test]
async fn test_return_to_origin_marks_order_returned() {
    let server = MockServer::start().await;
    stub_scan(&server, "AWB200", "Returned To Origin").await;

    let tracking = carrier(&server).track("AWB200").await.unwrap();
    let (status, cascade) = plan_update(ShipmentStatus::RtoInitiated, &tracking.status);

    assert_eq!(status, Some(ShipmentStatus::RtoDelivered));
    assert_eq!(cascade, Some(FulfillmentStatus::Returned));
}

#[tokio::test]
async fn test_unknown_scan_changes_nothing() {
    let server = MockServer::start().await;
    stub_scan(&server, "AWB300", "Held at customs for inspection").await;

    let tracking = carrier(&server).track("AWB300").await.unwrap();
    assert_eq!(plan_update(ShipmentStatus::InTransit, &tracking.status), (None, None));
}

#[tokio::test]
async fn test_intermediate_scan_does_not_cascade() {
    let server = MockServer::start().await;
    stub_scan(&server, "AWB400", "Out for delivery").await;

    let tracking = carrier(&server).track("AWB400").await.unwrap();
    assert_eq!(
        plan_update(ShipmentStatus::InTransit, &tracking.status),
        (Some(ShipmentStatus::OutForDelivery), None)
    );
}

#[tokio::test]
async fn test_carrier_outage_is_skipped_per_shipment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = carrier(&server).track("AWB500").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unreadable_carrier_response_is_bad_gateway() {
    let response = AppError::Carrier(CarrierError::Decode("missing current_status".into()))
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_GATEWAY");
    assert_eq!(body["message"], "Carrier service error");
}

#[test]
fn test_only_paid_live_orders_ship() {
    assert!(check_shippable(PaymentStatus::Paid, FulfillmentStatus::Unfulfilled).is_ok());
    assert!(check_shippable(PaymentStatus::Pending, FulfillmentStatus::Unfulfilled).is_err());
    assert!(check_shippable(PaymentStatus::Paid, FulfillmentStatus::Cancelled).is_err());
}

#[test]
fn test_shipment_body_is_trimmed_and_checked() {
    let ok = NewShipment {
        carrier: " Delhivery ".to_string(),
        tracking_number: " AWB-77 ".to_string(),
    }
    .validated()
    .unwrap();
    assert_eq!(ok.carrier, "Delhivery");
    assert_eq!(ok.tracking_number, "AWB-77");

    let bad = NewShipment {
        carrier: "Delhivery".to_string(),
        tracking_number: "AWB 77".to_string(),
    };
    assert!(bad.validated().is_err());
}
