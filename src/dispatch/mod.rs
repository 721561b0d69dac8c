//! Concurrent query dispatch.
//!
//! [`engine::QueryDispatcher`] resolves the beacons a query reaches,
//! asks each leaf through its provider strategy and a
//! [`fetcher::ResponseFetcher`], and reduces the answers with
//! [`aggregator::reduce`].
//!
//! Provider faults never escape as errors. A timeout, transport failure or
//! unreadable body becomes `Unknown` with an [`ErrorKind`](crate::core::types::ErrorKind)
//! attached, and `Unknown` can never make an aggregate `True`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use beacon_hub::catalog::shared::SharedCatalog;
//! use beacon_hub::core::query::Query;
//! use beacon_hub::dispatch::engine::{DispatchConfig, QueryDispatcher};
//! use beacon_hub::dispatch::fetcher::{FetcherConfig, HttpFetcher};
//! use beacon_hub::BeaconCatalog;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let catalog = Arc::new(SharedCatalog::new(BeaconCatalog::load_embedded()?));
//! let fetcher = HttpFetcher::new(&FetcherConfig::default())?;
//! let dispatcher = QueryDispatcher::new(catalog, fetcher, DispatchConfig::default());
//!
//! let answers = dispatcher.query_all(&Query::new("13", 32_936_732, "G")).await;
//! println!("any beacon: {}", answers.aggregate.value);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod engine;
pub mod fetcher;
