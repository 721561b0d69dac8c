//! HTTP API over the query dispatcher.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! beacon-hub serve
//!
//! # Custom port and auto-open browser
//! beacon-hub serve --port 3000 --open
//!
//! # Bind to all interfaces
//! beacon-hub serve --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/beacons` - List visible beacons
//! - `GET /api/beacons/{id}` - One beacon
//! - `GET /api/responses?chrom=&pos=&allele=[&ref=][&beacon=]` - Every
//!   beacon's answer followed by the `all` aggregate, or one beacon's answer
//! - `GET /api/responses/{beacon_id}?chrom=&pos=&allele=[&ref=]` - One answer
//!
//! Answers are `{beacon, query, response}` where `response` is `true`,
//! `false` or `null` (unknown). An unknown beacon id is not an HTTP error:
//! it is answered with the `invalid beacon` sentinel.

pub mod server;
