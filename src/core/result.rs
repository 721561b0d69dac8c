use serde::{Deserialize, Serialize};

use crate::catalog::store::BeaconCatalog;
use crate::core::query::Query;
use crate::core::types::{BeaconId, ErrorKind, TriBool};

/// Name reported for a beacon id that is not in the catalog
pub const INVALID_BEACON_NAME: &str = "invalid beacon";

/// Id and name reported for the aggregate over the whole catalog
pub const AGGREGATE_BEACON_ID: &str = "all";
pub const AGGREGATE_BEACON_NAME: &str = "beacon of beacons";

/// Outcome of asking one beacon (or aggregating several)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconResult {
    /// `None` only for the invalid-beacon sentinel
    pub beacon_id: Option<BeaconId>,
    pub value: TriBool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl BeaconResult {
    /// A plain answer with no error attached
    pub fn answered(beacon_id: BeaconId, value: TriBool) -> Self {
        Self {
            beacon_id: Some(beacon_id),
            value,
            error: None,
        }
    }

    /// An `Unknown` answer caused by `kind`
    pub fn failed(beacon_id: BeaconId, kind: ErrorKind) -> Self {
        Self {
            beacon_id: Some(beacon_id),
            value: TriBool::Unknown,
            error: Some(kind),
        }
    }

    /// Sentinel returned for a beacon id the catalog does not know
    #[must_use]
    pub fn invalid_beacon() -> Self {
        Self {
            beacon_id: None,
            value: TriBool::Unknown,
            error: Some(ErrorKind::InvalidBeacon),
        }
    }

    #[must_use]
    pub fn is_invalid_beacon(&self) -> bool {
        self.beacon_id.is_none() && self.error == Some(ErrorKind::InvalidBeacon)
    }
}

/// Beacon identity as shown to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconSummary {
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default)]
    pub aggregator: bool,
}

impl BeaconSummary {
    /// Look the beacon up in `catalog`; unknown ids render as the sentinel
    #[must_use]
    pub fn describe(beacon_id: Option<&BeaconId>, catalog: &BeaconCatalog) -> Self {
        let Some(beacon) = beacon_id.and_then(|id| catalog.get_beacon(id)) else {
            return Self::invalid();
        };
        Self {
            id: Some(beacon.id.0.clone()),
            name: beacon.name.clone(),
            organization: catalog
                .get_organization(&beacon.organization)
                .map(|o| o.name.clone()),
            aggregator: beacon.aggregator,
        }
    }

    #[must_use]
    pub fn invalid() -> Self {
        Self {
            id: None,
            name: INVALID_BEACON_NAME.to_string(),
            organization: None,
            aggregator: false,
        }
    }

    #[must_use]
    pub fn aggregate() -> Self {
        Self {
            id: Some(AGGREGATE_BEACON_ID.to_string()),
            name: AGGREGATE_BEACON_NAME.to_string(),
            organization: None,
            aggregator: true,
        }
    }
}

/// Wire form of a result: `{beacon, query, response: true|false|null}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconResponse {
    pub beacon: BeaconSummary,
    pub query: Query,
    pub response: TriBool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl BeaconResponse {
    #[must_use]
    pub fn from_result(result: &BeaconResult, query: &Query, catalog: &BeaconCatalog) -> Self {
        Self {
            beacon: BeaconSummary::describe(result.beacon_id.as_ref(), catalog),
            query: query.clone(),
            response: result.value,
            error: result.error,
        }
    }

    /// The `all` entry carrying the catalog-wide answer
    #[must_use]
    pub fn aggregate(result: &BeaconResult, query: &Query) -> Self {
        Self {
            beacon: BeaconSummary::aggregate(),
            query: query.clone(),
            response: result.value,
            error: result.error,
        }
    }
}
