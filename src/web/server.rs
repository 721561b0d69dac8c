use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::store::BeaconCatalog;
use crate::cli::{EngineOptions, ServeArgs};
use crate::core::beacon::Beacon;
use crate::core::query::Query as VariantQuery;
use crate::core::result::BeaconResponse;
use crate::core::types::{BeaconId, ReferenceGenome};
use crate::dispatch::engine::QueryDispatcher;

/// Shared application state
pub struct AppState {
    pub dispatcher: QueryDispatcher,
}

/// Error body for requests that cannot be answered at all
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

/// Variant parameters as they arrive on the query string.
///
/// Everything is optional text: a missing or unparseable value makes the
/// query incomplete, which the dispatcher answers rather than rejects.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseParams {
    pub chrom: Option<String>,
    pub pos: Option<String>,
    pub allele: Option<String>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub beacon: Option<String>,
}

impl ResponseParams {
    fn to_query(&self) -> VariantQuery {
        VariantQuery {
            chromosome: self.chrom.clone(),
            position: self.pos.as_deref().and_then(|p| p.trim().parse().ok()),
            allele: self.allele.clone(),
            reference: self.reference.as_deref().and_then(ReferenceGenome::parse),
        }
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the tokio runtime cannot
/// be created, or the server fails to start.
pub fn run(args: ServeArgs, engine: &EngineOptions) -> anyhow::Result<()> {
    let dispatcher = engine.dispatcher()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, dispatcher).await })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?;

    // Provider calls are bounded by the dispatch deadline; leave room for it
    let request_timeout = state
        .dispatcher
        .config()
        .request_timeout
        .saturating_add(Duration::from_secs(5));

    let app = Router::new()
        .route("/api/beacons", get(beacons_handler))
        .route("/api/beacons/{id}", get(beacon_handler))
        .route("/api/responses", get(responses_handler))
        .route("/api/responses/{beacon_id}", get(beacon_response_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // IP-based rate limiting to prevent abuse
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                // Each request fans out to every beacon, so keep this low
                .layer(ConcurrencyLimitLayer::new(32)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs, dispatcher: QueryDispatcher) -> anyhow::Result<()> {
    let beacons = dispatcher.catalog().snapshot().len();
    let app = create_router(Arc::new(AppState { dispatcher }))?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting beacon-hub web server at http://{addr}");
    tracing::info!(%addr, beacons, "Serving beacon API");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/beacons"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn beacon_json(catalog: &BeaconCatalog, beacon: &Beacon) -> serde_json::Value {
    serde_json::json!({
        "id": beacon.id,
        "name": beacon.name,
        "organization": catalog
            .get_organization(&beacon.organization)
            .map(|o| o.name.as_str()),
        "aggregator": beacon.aggregator,
        "enabled": beacon.enabled,
        "supported_references": beacon.supported_references,
        "children": beacon.children,
        "description": beacon.description,
    })
}

/// List the visible beacons
async fn beacons_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let catalog = state.dispatcher.catalog().snapshot();
    let beacons: Vec<serde_json::Value> = catalog
        .list_visible()
        .into_iter()
        .map(|b| beacon_json(&catalog, b))
        .collect();

    Json(serde_json::json!({
        "count": beacons.len(),
        "beacons": beacons,
    }))
}

/// One visible beacon
async fn beacon_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let catalog = state.dispatcher.catalog().snapshot();
    match catalog.get_visible(&BeaconId::new(id)) {
        Some(beacon) => Json(beacon_json(&catalog, beacon)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(create_safe_error_response(
                "not_found",
                "Beacon not found",
                None,
            )),
        )
            .into_response(),
    }
}

/// Answers of every visible beacon plus the aggregate, or of the beacon
/// named by the `beacon` parameter
async fn responses_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResponseParams>,
) -> Json<Vec<BeaconResponse>> {
    let query = params.to_query();
    let dispatcher = &state.dispatcher;

    let responses = match &params.beacon {
        Some(id) => vec![
            dispatcher
                .respond_one(&BeaconId::new(id.as_str()), &query)
                .await,
        ],
        None => dispatcher.respond_all(&query).await,
    };

    Json(responses)
}

/// Answer of one beacon
async fn beacon_response_handler(
    State(state): State<Arc<AppState>>,
    Path(beacon_id): Path<String>,
    Query(params): Query<ResponseParams>,
) -> Json<BeaconResponse> {
    let query = params.to_query();
    Json(
        state
            .dispatcher
            .respond_one(&BeaconId::new(beacon_id), &query)
            .await,
    )
}
