use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::{BeaconId, OrganizationId, ReferenceGenome};
use crate::provider::registry::StrategyId;

/// An organization operating one or more beacons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OrganizationId::new(id),
            name: name.into(),
        }
    }
}

/// A queryable source, either a leaf backed by a provider strategy or an
/// aggregator standing for the union of its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beacon {
    /// Unique identifier
    pub id: BeaconId,

    /// Human-readable name
    pub name: String,

    /// Owning organization
    pub organization: OrganizationId,

    /// Listed by the catalog and answerable through the API
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Disabled beacons are never dispatched
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Aggregators have children instead of a strategy
    #[serde(default)]
    pub aggregator: bool,

    /// Provider endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Reference genomes the provider can answer for
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub supported_references: BTreeSet<ReferenceGenome>,

    /// Request/response strategy; present exactly on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyId>,

    /// Child beacons; only aggregators have them
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub children: BTreeSet<BeaconId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Beacon {
    /// A visible, enabled leaf beacon using `strategy`
    pub fn leaf(
        id: impl Into<String>,
        name: impl Into<String>,
        organization: impl Into<String>,
        strategy: StrategyId,
    ) -> Self {
        Self {
            id: BeaconId::new(id),
            name: name.into(),
            organization: OrganizationId::new(organization),
            visible: true,
            enabled: true,
            aggregator: false,
            url: None,
            supported_references: BTreeSet::new(),
            strategy: Some(strategy),
            children: BTreeSet::new(),
            description: None,
        }
    }

    /// A visible, enabled aggregator with no children yet
    pub fn aggregator(
        id: impl Into<String>,
        name: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            id: BeaconId::new(id),
            name: name.into(),
            organization: OrganizationId::new(organization),
            visible: true,
            enabled: true,
            aggregator: true,
            url: None,
            supported_references: BTreeSet::new(),
            strategy: None,
            children: BTreeSet::new(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_references(mut self, refs: impl IntoIterator<Item = ReferenceGenome>) -> Self {
        self.supported_references = refs.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(BeaconId::new).collect();
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn supports(&self, reference: ReferenceGenome) -> bool {
        self.supported_references.contains(&reference)
    }

    /// Reference used when a query does not declare one
    #[must_use]
    pub fn default_reference(&self) -> ReferenceGenome {
        self.supported_references
            .iter()
            .next()
            .copied()
            .unwrap_or(ReferenceGenome::Hg19)
    }
}
