//! # beacon-hub
//!
//! A library for asking many genomic variant beacons at once.
//!
//! A beacon answers a single question: has it seen a given allele at a given
//! position? Dozens of institutions run beacons, each with its own URL scheme
//! and answer format, and some beacons are aggregators standing for the union
//! of others.
//!
//! `beacon-hub` sends a query to every relevant beacon concurrently, reads each
//! answer with the right provider strategy, and combines the answers with a
//! three-valued OR.
//!
//! ## Features
//!
//! - **Provider strategies**: twelve request templates and seven answer encodings
//! - **Concurrent fan-out**: one deadline bounds the whole batch
//! - **Failure isolation**: timeouts and garbage answers become unknown, never errors
//! - **Hierarchy**: aggregators over an acyclic beacon graph, checked at load time
//! - **Snapshots**: catalog updates never disturb queries in flight
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use beacon_hub::{BeaconCatalog, Query, QueryDispatcher, SharedCatalog};
//! use beacon_hub::dispatch::engine::DispatchConfig;
//! use beacon_hub::dispatch::fetcher::{FetcherConfig, HttpFetcher};
//!
//! # async fn run() -> anyhow::Result<()> {
//! // Load the embedded catalog of known beacons
//! let catalog = Arc::new(SharedCatalog::new(BeaconCatalog::load_embedded()?));
//! let fetcher = HttpFetcher::new(&FetcherConfig::default())?;
//! let dispatcher = QueryDispatcher::new(catalog, fetcher, DispatchConfig::default());
//!
//! let answers = dispatcher.query_all(&Query::new("13", 32_936_732, "G")).await;
//! for (id, result) in &answers.per_beacon {
//!     println!("{id}: {}", result.value);
//! }
//! println!("any: {}", answers.aggregate.value);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Beacon catalog storage, hierarchy and snapshots
//! - [`core`]: Core data types for beacons, queries and answers
//! - [`provider`]: Request templates and response parsers per provider
//! - [`dispatch`]: Concurrent dispatch and answer aggregation
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP API

pub mod catalog;
pub mod cli;
pub mod core;
pub mod dispatch;
pub mod provider;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::shared::SharedCatalog;
pub use catalog::store::BeaconCatalog;
pub use core::beacon::{Beacon, Organization};
pub use core::query::Query;
pub use core::result::{BeaconResponse, BeaconResult};
pub use core::types::*;
pub use dispatch::engine::{QueryAllResponse, QueryDispatcher};
