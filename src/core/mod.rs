//! Core data types for beacon queries.
//!
//! - [`Beacon`](beacon::Beacon), [`Organization`](beacon::Organization): catalog entries
//! - [`Query`](query::Query): the variant being asked about
//! - [`BeaconResult`](result::BeaconResult): one beacon's tri-state answer
//! - [`BeaconResponse`](result::BeaconResponse): the serialized answer sent to clients
//! - [`TriBool`](types::TriBool), [`ErrorKind`](types::ErrorKind): answer values
//!
//! ## Answers
//!
//! | Value | JSON | Meaning |
//! |-------|------|---------|
//! | True | `true` | the beacon has seen the allele |
//! | False | `false` | the beacon has not seen it |
//! | Unknown | `null` | timeout, transport failure or unreadable answer |

pub mod beacon;
pub mod query;
pub mod result;
pub mod types;
