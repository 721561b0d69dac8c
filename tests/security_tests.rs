//! Security and abuse tests for the HTTP API
//!
//! All beacons here lack a URL, so no test reaches the network.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use beacon_hub::dispatch::engine::DispatchConfig;
use beacon_hub::dispatch::fetcher::{FetcherConfig, HttpFetcher};
use beacon_hub::web::server::{create_router, create_safe_error_response, AppState};
use beacon_hub::{BeaconCatalog, QueryDispatcher, SharedCatalog};
use tower::ServiceExt;

const CATALOG: &str = r#"{
    "version": "1.0.0",
    "created_at": "2024-01-01T00:00:00Z",
    "organizations": [{"id": "org", "name": "Org"}],
    "beacons": [
        {"id": "a", "name": "Beacon A", "organization": "org", "strategy": "broad"},
        {"id": "b", "name": "Beacon B", "organization": "org", "strategy": "ncbi"}
    ]
}"#;

fn app() -> Router {
    let catalog = BeaconCatalog::from_json(CATALOG).unwrap();
    let dispatcher = QueryDispatcher::new(
        Arc::new(SharedCatalog::new(catalog)),
        HttpFetcher::new(&FetcherConfig::default()).unwrap(),
        DispatchConfig {
            request_timeout: Duration::from_secs(1),
        },
    );
    create_router(Arc::new(AppState { dispatcher })).unwrap()
}

fn request(uri: &str, peer: [u8; 4]) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 4000))));
    request
}

#[test]
fn test_error_sanitization() {
    let error_response = create_safe_error_response(
        "not_found",
        "Beacon not found",
        Some("/internal/path/store.rs:123 - index out of sync"),
    );

    assert_eq!(error_response.error, "Beacon not found");
    assert_eq!(error_response.error_type, "not_found");
    assert!(
        error_response.details.is_none(),
        "Internal details should never be exposed"
    );

    let error_response = create_safe_error_response("not_found", "Beacon not found", None);
    assert!(error_response.details.is_none());
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let response = app()
        .oneshot(request("/api/beacons/..%2F..%2Fetc%2Fpasswd", [127, 0, 0, 1]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Beacon not found");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn test_hostile_query_parameters_are_answered_not_rejected() {
    let uris = [
        // position overflows u64
        "/api/responses?chrom=1&pos=999999999999999999999999&allele=A",
        "/api/responses?chrom=1&pos=-5&allele=A",
        "/api/responses?chrom=%00%01&pos=1&allele=A&ref=hg17",
        "/api/responses/a?chrom=1&pos=abc&allele=A",
    ];

    for uri in uris {
        let response = app().oneshot(request(uri, [127, 0, 0, 1])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_rapid_request_flood_is_rate_limited() {
    let app = app();
    let mut limited = 0;

    for _ in 0..80 {
        let response = app
            .clone()
            .oneshot(request("/api/beacons", [10, 0, 0, 1]))
            .await
            .unwrap();
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    assert!(limited > 0, "burst beyond the limit should be throttled");

    // another client is unaffected
    let response = app
        .oneshot(request("/api/beacons", [10, 0, 0, 2]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
