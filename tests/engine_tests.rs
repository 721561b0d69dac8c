//! End-to-end dispatch tests against mocked beacon providers.
//!
//! Every provider is a wiremock server route, so these tests exercise the
//! real request templates, the reqwest-backed fetcher and the parsers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use beacon_hub::dispatch::engine::DispatchConfig;
use beacon_hub::dispatch::fetcher::{FetcherConfig, HttpFetcher};
use beacon_hub::{BeaconCatalog, BeaconId, ErrorKind, Query, QueryDispatcher, SharedCatalog, TriBool};
use wiremock::matchers::{any, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_json(base: &str) -> String {
    format!(
        r#"{{
        "version": "1.0.0",
        "created_at": "2024-01-01T00:00:00Z",
        "organizations": [{{"id": "org", "name": "Test Organization"}}],
        "beacons": [
            {{"id": "clinvar", "name": "ClinVar", "organization": "org", "strategy": "ucsc",
              "url": "{base}/ucsc", "supported_references": ["hg19"]}},
            {{"id": "lovd", "name": "LOVD", "organization": "org", "strategy": "ucsc-v2",
              "url": "{base}/ucsc-v2", "supported_references": ["hg19"]}},
            {{"id": "ebi", "name": "EBI", "organization": "org", "strategy": "ebi",
              "url": "{base}/ebi", "supported_references": ["hg19"]}},
            {{"id": "ncbi", "name": "NCBI", "organization": "org", "strategy": "ncbi",
              "url": "{base}/ncbi", "supported_references": ["hg19", "hg38"]}},
            {{"id": "amplab", "name": "AMPLab", "organization": "org", "strategy": "amplab",
              "url": "{base}/amplab"}},
            {{"id": "cafe-central", "name": "Cafe Central", "organization": "org",
              "strategy": "cafe-variome", "url": "{base}/cafe"}},
            {{"id": "icgc", "name": "ICGC", "organization": "org", "strategy": "icgc",
              "url": "{base}/icgc"}},
            {{"id": "ucsc", "name": "UCSC", "organization": "org", "aggregator": true,
              "children": ["clinvar", "lovd"]}},
            {{"id": "bob", "name": "Beacon of Beacons", "organization": "org", "aggregator": true,
              "children": ["clinvar", "lovd", "ebi", "ncbi", "amplab", "cafe-central", "icgc"]}}
        ]
    }}"#
    )
}

fn dispatcher(catalog: BeaconCatalog, timeout: Duration) -> QueryDispatcher {
    QueryDispatcher::new(
        Arc::new(SharedCatalog::new(catalog)),
        HttpFetcher::new(&FetcherConfig::default()).unwrap(),
        DispatchConfig {
            request_timeout: timeout,
        },
    )
}

/// Every provider answers "no" in its own dialect
async fn mount_negative_providers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ucsc"))
        .and(query_param("track", "clinvar"))
        .and(query_param("chrom", "13"))
        .and(query_param("pos", "32936732"))
        .and(query_param("allele", "G"))
        .respond_with(ResponseTemplate::new(200).set_body_string("NO"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ebi"))
        .and(query_param("referenceName", "13"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{"exists":false}}"#))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ncbi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{"exists":0}}"#))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/amplab"))
        .and(body_string_contains("allele=G"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Not found"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"response":{"central_response":false}}"#),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icgc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_every_provider_says_no() {
    let server = MockServer::start().await;
    mount_negative_providers(&server).await;
    Mock::given(method("GET"))
        .and(path("/ucsc-v2"))
        .and(query_param("dataset", "lovd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":false}"#))
        .mount(&server)
        .await;

    let catalog = BeaconCatalog::from_json(&catalog_json(&server.uri())).unwrap();
    let d = dispatcher(catalog, Duration::from_secs(5));
    let all = d.query_all(&Query::new("13", 32_936_732, "G")).await;

    for (id, result) in &all.per_beacon {
        assert_eq!(result.value, TriBool::False, "beacon {id}: {result:?}");
    }
    assert_eq!(all.aggregate.value, TriBool::False);
}

#[tokio::test]
async fn test_one_yes_makes_the_aggregate_yes() {
    let server = MockServer::start().await;
    mount_negative_providers(&server).await;
    Mock::given(method("GET"))
        .and(path("/ucsc-v2"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":true}"#))
        .mount(&server)
        .await;

    let catalog = BeaconCatalog::from_json(&catalog_json(&server.uri())).unwrap();
    let d = dispatcher(catalog, Duration::from_secs(5));
    let query = Query::new("13", 32_936_732, "G");

    let all = d.query_all(&query).await;
    assert_eq!(all.per_beacon[&BeaconId::new("lovd")].value, TriBool::True);
    assert_eq!(all.per_beacon[&BeaconId::new("ucsc")].value, TriBool::True);
    assert_eq!(all.per_beacon[&BeaconId::new("bob")].value, TriBool::True);
    assert_eq!(all.aggregate.value, TriBool::True);

    let ucsc = d.query_one(&BeaconId::new("ucsc"), &query).await;
    assert_eq!(ucsc.value, TriBool::True);
}

#[tokio::test]
async fn test_slow_provider_times_out_without_hiding_a_yes() {
    let server = MockServer::start().await;
    mount_negative_providers(&server).await;
    Mock::given(method("GET"))
        .and(path("/ucsc-v2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"response":false}"#)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    // takes precedence over the negative Cafe Variome answer
    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"central_response":"true"}"#))
        .with_priority(1)
        .mount(&server)
        .await;

    let catalog = BeaconCatalog::from_json(&catalog_json(&server.uri())).unwrap();
    let d = dispatcher(catalog, Duration::from_millis(500));

    let started = Instant::now();
    let all = d.query_all(&Query::new("13", 32_936_732, "G")).await;
    assert!(started.elapsed() < Duration::from_secs(5));

    let lovd = &all.per_beacon[&BeaconId::new("lovd")];
    assert_eq!(lovd.value, TriBool::Unknown);
    assert_eq!(lovd.error, Some(ErrorKind::Timeout));
    assert_eq!(all.per_beacon[&BeaconId::new("cafe-central")].value, TriBool::True);
    // clinvar says no, lovd is unknown
    assert_eq!(all.per_beacon[&BeaconId::new("ucsc")].value, TriBool::Unknown);
    assert_eq!(all.aggregate.value, TriBool::True);
}

#[tokio::test]
async fn test_broken_providers_are_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ucsc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("maybe"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ucsc-v2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let catalog = BeaconCatalog::from_json(&catalog_json(&server.uri())).unwrap();
    let d = dispatcher(catalog, Duration::from_secs(5));
    let query = Query::new("13", 32_936_732, "G");

    let clinvar = d.query_one(&BeaconId::new("clinvar"), &query).await;
    assert_eq!(clinvar.value, TriBool::Unknown);
    assert_eq!(clinvar.error, Some(ErrorKind::UnrecognizedResponse));

    let lovd = d.query_one(&BeaconId::new("lovd"), &query).await;
    assert_eq!(lovd.value, TriBool::Unknown);
    assert_eq!(lovd.error, Some(ErrorKind::Transport));

    let ucsc = d.query_one(&BeaconId::new("ucsc"), &query).await;
    assert_eq!(ucsc.value, TriBool::Unknown);
    assert!(ucsc.error.is_none());
}

#[tokio::test]
async fn test_incomplete_query_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_string("yes"))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = BeaconCatalog::from_json(&catalog_json(&server.uri())).unwrap();
    let d = dispatcher(catalog, Duration::from_secs(5));

    let mut query = Query::new("13", 32_936_732, "G");
    query.allele = None;

    let all = d.query_all(&query).await;
    assert_eq!(all.aggregate.value, TriBool::False);
    assert!(all.per_beacon.is_empty());

    let one = d.query_one(&BeaconId::new("bob"), &query).await;
    assert_eq!(one.error, Some(ErrorKind::InvalidQuery));

    let unknown = d.query_one(&BeaconId::new("nonexistent-id"), &query).await;
    assert!(unknown.is_invalid_beacon());
    // expectations are verified when the server is dropped
}

#[tokio::test]
async fn test_embedded_catalog_builds_a_dispatcher() {
    let catalog = BeaconCatalog::load_embedded().unwrap();
    let d = dispatcher(catalog, Duration::from_secs(1));

    let result = d
        .query_one(&BeaconId::new("nonexistent-id"), &Query::new("1", 1, "A"))
        .await;
    assert!(result.is_invalid_beacon());
    assert!(d.catalog().snapshot().get_visible(&BeaconId::new("bob")).is_some());
}
