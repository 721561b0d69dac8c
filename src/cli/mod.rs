//! Command-line interface for beacon-hub.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **query**: Ask every beacon (or one beacon) about a variant
//! - **catalog**: List, show, print or export the beacon catalog
//! - **serve**: Start the HTTP API
//!
//! ## Usage
//!
//! ```text
//! # Ask every beacon whether anyone has seen 13:32936732 G
//! beacon-hub query --chrom 13 --pos 32936732 --allele G
//!
//! # Ask one aggregator, JSON output for scripting
//! beacon-hub query --chrom 13 --pos 32936732 --allele G --beacon ucsc --format json
//!
//! # Print the aggregator hierarchy
//! beacon-hub catalog tree
//!
//! # Start the API with a custom catalog
//! beacon-hub --catalog my_beacons.json serve --port 8080 --open
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::catalog::shared::SharedCatalog;
use crate::catalog::store::BeaconCatalog;
use crate::dispatch::engine::{DispatchConfig, QueryDispatcher, DEFAULT_REQUEST_TIMEOUT};
use crate::dispatch::fetcher::{FetcherConfig, HttpFetcher, DEFAULT_FETCH_TIMEOUT};

pub mod catalog;
pub mod query;

#[derive(Parser)]
#[command(name = "beacon-hub")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Ask many genomic variant beacons at once and combine their answers")]
#[command(
    long_about = "beacon-hub asks a catalog of GA4GH beacons whether they have seen a variant.\n\nEvery beacon is queried concurrently under a single deadline and the answers are combined:\n- yes if any beacon confirms the allele\n- no if every beacon denies it\n- unknown otherwise (timeouts, failures, unreadable answers)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub engine: EngineOptions,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask beacons about a variant
    Query(query::QueryArgs),

    /// Inspect the beacon catalog
    Catalog(catalog::CatalogArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Settings shared by every command that loads the catalog or asks beacons
#[derive(clap::Args, Clone, Debug)]
pub struct EngineOptions {
    /// Path to custom catalog file (defaults to the embedded catalog)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Deadline for each beacon, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Connect and read timeout of the HTTP client, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub connect_timeout_secs: u64,
}

impl EngineOptions {
    /// Load the custom catalog if one was given, else the embedded one
    pub fn load_catalog(&self) -> anyhow::Result<BeaconCatalog> {
        let catalog = match &self.catalog {
            Some(path) => BeaconCatalog::load_from_file(path)?,
            None => BeaconCatalog::load_embedded()?,
        };
        Ok(catalog)
    }

    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    #[must_use]
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.connect_timeout_secs),
            ..FetcherConfig::default()
        }
    }

    /// Build a dispatcher over the configured catalog
    pub fn dispatcher(&self) -> anyhow::Result<QueryDispatcher> {
        let catalog = Arc::new(SharedCatalog::new(self.load_catalog()?));
        let fetcher = HttpFetcher::new(&self.fetcher_config())?;
        Ok(QueryDispatcher::new(
            catalog,
            fetcher,
            self.dispatch_config(),
        ))
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_engine_options() {
        let cli = Cli::try_parse_from([
            "beacon-hub",
            "catalog",
            "list",
            "--timeout-secs",
            "3",
            "--catalog",
            "custom.json",
        ])
        .unwrap();

        assert_eq!(cli.engine.timeout_secs, 3);
        assert_eq!(cli.engine.connect_timeout_secs, DEFAULT_FETCH_TIMEOUT.as_secs());
        assert_eq!(
            cli.engine.dispatch_config().request_timeout,
            Duration::from_secs(3)
        );
        assert_eq!(cli.engine.catalog, Some(PathBuf::from("custom.json")));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["beacon-hub", "serve"]).unwrap();
        assert!(cli.engine.catalog.is_none());
        assert_eq!(
            cli.engine.dispatch_config().request_timeout,
            DEFAULT_REQUEST_TIMEOUT
        );
        assert_eq!(cli.engine.fetcher_config().timeout, DEFAULT_FETCH_TIMEOUT);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, 8080);
                assert_eq!(args.address, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }
}
