//! Beacon catalog storage and hierarchy.
//!
//! The catalog lists every known beacon, the organization running it, and
//! the aggregator → child relation. An embedded catalog is compiled into the
//! binary, but custom catalogs can also be loaded from JSON files.
//!
//! ## Embedded Catalog
//!
//! - **Leaves**: EBI, NCBI, WTSI, AMPLab, Kaviar, Broad, ICGC, the UCSC
//!   tracks, the Google/DNAstack hosted datasets and Cafe Variome sites
//! - **Aggregators**: `ucsc`, `google`, `cafe-variome`, and `bob` (every leaf)
//!
//! ## Example
//!
//! ```rust,no_run
//! use beacon_hub::BeaconCatalog;
//! use beacon_hub::core::types::BeaconId;
//!
//! let catalog = BeaconCatalog::load_embedded().unwrap();
//!
//! for beacon in catalog.list_visible() {
//!     println!("{} ({})", beacon.name, beacon.id);
//! }
//!
//! let children = catalog.list_children(&BeaconId::new("cafe-variome"));
//! ```
//!
//! ## Custom Catalogs
//!
//! ```rust,no_run
//! use beacon_hub::BeaconCatalog;
//! use std::path::Path;
//!
//! let catalog = BeaconCatalog::load_embedded().unwrap();
//! let json = catalog.to_json().unwrap();
//!
//! let custom = BeaconCatalog::load_from_file(Path::new("my_beacons.json")).unwrap();
//! ```

pub mod hierarchy;
pub mod shared;
pub mod store;
