use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::catalog::hierarchy;
use crate::core::beacon::{Beacon, Organization};
use crate::core::types::{BeaconId, OrganizationId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate beacon id '{0}'")]
    DuplicateBeacon(BeaconId),

    #[error("Duplicate organization id '{0}'")]
    DuplicateOrganization(OrganizationId),

    #[error("Beacon '{beacon}' belongs to unknown organization '{organization}'")]
    UnknownOrganization {
        beacon: BeaconId,
        organization: OrganizationId,
    },

    #[error("Aggregator '{parent}' lists unknown child '{child}'")]
    UnknownChild { parent: BeaconId, child: BeaconId },

    #[error("Aggregator '{0}' must not declare a strategy")]
    AggregatorWithStrategy(BeaconId),

    #[error("Beacon '{0}' is not an aggregator and must declare a strategy")]
    LeafWithoutStrategy(BeaconId),

    #[error("Beacon '{0}' is not an aggregator and cannot have children")]
    LeafWithChildren(BeaconId),

    #[error("Beacon hierarchy contains a cycle through '{0}'")]
    Cycle(BeaconId),

    #[error("Beacon '{0}' not found")]
    NotFound(BeaconId),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    pub beacons: Vec<Beacon>,
}

/// Beacon definitions and their aggregator hierarchy.
///
/// A catalog obtained from [`BeaconCatalog::from_json`] (or any other loader)
/// has passed [`BeaconCatalog::validate`]: ids are unique, every reference
/// resolves, leaves and aggregators are well formed, and the hierarchy is
/// acyclic. It is read-only while queries run; see
/// [`SharedCatalog`](crate::catalog::shared::SharedCatalog) for updates.
#[derive(Debug, Clone, Default)]
pub struct BeaconCatalog {
    organizations: Vec<Organization>,

    beacons: Vec<Beacon>,

    /// Index: organization ID -> index in organizations vec
    org_to_index: HashMap<OrganizationId, usize>,

    /// Index: beacon ID -> index in beacons vec
    id_to_index: HashMap<BeaconId, usize>,

    /// Index: child ID -> aggregators listing it
    parents: HashMap<BeaconId, Vec<BeaconId>>,
}

impl BeaconCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the embedded default catalog
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Validated at compile time by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/beacons.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                expected = CATALOG_VERSION,
                found = %data.version,
                "Catalog version mismatch"
            );
        }

        Self::from_parts(data.organizations, data.beacons)
    }

    /// Build and validate a catalog
    pub fn from_parts(
        organizations: Vec<Organization>,
        beacons: Vec<Beacon>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for organization in organizations {
            catalog.add_organization(organization)?;
        }
        for beacon in beacons {
            catalog.add_beacon(beacon)?;
        }
        catalog.validate()?;

        tracing::info!(
            beacons = catalog.len(),
            organizations = catalog.organizations.len(),
            "Loaded beacon catalog"
        );
        Ok(catalog)
    }

    /// Add an organization; ids must be unique
    pub fn add_organization(&mut self, organization: Organization) -> Result<(), CatalogError> {
        if self.org_to_index.contains_key(&organization.id) {
            return Err(CatalogError::DuplicateOrganization(organization.id));
        }
        self.org_to_index
            .insert(organization.id.clone(), self.organizations.len());
        self.organizations.push(organization);
        Ok(())
    }

    /// Add a beacon; ids must be unique.
    ///
    /// Cross-references (organization, children, cycles) are only checked by
    /// [`validate`](Self::validate), so beacons can be added in any order.
    pub fn add_beacon(&mut self, beacon: Beacon) -> Result<(), CatalogError> {
        if self.id_to_index.contains_key(&beacon.id) {
            return Err(CatalogError::DuplicateBeacon(beacon.id));
        }
        check_shape(&beacon)?;

        for child in &beacon.children {
            self.parents
                .entry(child.clone())
                .or_default()
                .push(beacon.id.clone());
        }
        self.id_to_index.insert(beacon.id.clone(), self.beacons.len());
        self.beacons.push(beacon);
        Ok(())
    }

    /// Insert `beacon`, replacing any beacon with the same id
    pub fn upsert_beacon(&mut self, beacon: Beacon) -> Result<(), CatalogError> {
        check_shape(&beacon)?;
        match self.id_to_index.get(&beacon.id) {
            Some(&index) => {
                self.beacons[index] = beacon;
                self.rebuild_indexes();
            }
            None => self.add_beacon(beacon)?,
        }
        Ok(())
    }

    /// Remove a beacon and drop it from every aggregator's children
    pub fn remove_beacon(&mut self, id: &BeaconId) -> Result<Beacon, CatalogError> {
        let index = *self
            .id_to_index
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
        let removed = self.beacons.remove(index);
        for beacon in &mut self.beacons {
            beacon.children.remove(id);
        }
        self.rebuild_indexes();
        Ok(removed)
    }

    /// Rebuild the id and parent indexes after modifying beacons
    fn rebuild_indexes(&mut self) {
        self.id_to_index.clear();
        self.parents.clear();
        for (index, beacon) in self.beacons.iter().enumerate() {
            self.id_to_index.insert(beacon.id.clone(), index);
            for child in &beacon.children {
                self.parents
                    .entry(child.clone())
                    .or_default()
                    .push(beacon.id.clone());
            }
        }
    }

    /// Check cross-references and that the hierarchy is acyclic
    pub fn validate(&self) -> Result<(), CatalogError> {
        for beacon in &self.beacons {
            if !self.org_to_index.contains_key(&beacon.organization) {
                return Err(CatalogError::UnknownOrganization {
                    beacon: beacon.id.clone(),
                    organization: beacon.organization.clone(),
                });
            }
            if let Some(child) = beacon
                .children
                .iter()
                .find(|c| !self.id_to_index.contains_key(*c))
            {
                return Err(CatalogError::UnknownChild {
                    parent: beacon.id.clone(),
                    child: child.clone(),
                });
            }
        }

        match hierarchy::find_cycle(self) {
            Some(id) => Err(CatalogError::Cycle(id)),
            None => Ok(()),
        }
    }

    /// Get any beacon by ID, visible or not
    #[must_use]
    pub fn get_beacon(&self, id: &BeaconId) -> Option<&Beacon> {
        self.id_to_index.get(id).map(|&idx| &self.beacons[idx])
    }

    /// Get a beacon as the API sees it: invisible beacons do not exist
    #[must_use]
    pub fn get_visible(&self, id: &BeaconId) -> Option<&Beacon> {
        self.get_beacon(id).filter(|b| b.visible)
    }

    #[must_use]
    pub fn get_organization(&self, id: &OrganizationId) -> Option<&Organization> {
        self.org_to_index
            .get(id)
            .map(|&idx| &self.organizations[idx])
    }

    /// All beacons in catalog order
    #[must_use]
    pub fn beacons(&self) -> &[Beacon] {
        &self.beacons
    }

    #[must_use]
    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    /// Visible beacons in catalog order
    #[must_use]
    pub fn list_visible(&self) -> Vec<&Beacon> {
        self.beacons.iter().filter(|b| b.visible).collect()
    }

    /// Children of an aggregator, in id order; empty for leaves and unknown ids
    #[must_use]
    pub fn list_children(&self, id: &BeaconId) -> Vec<&Beacon> {
        self.get_beacon(id)
            .map(|b| {
                b.children
                    .iter()
                    .filter_map(|child| self.get_beacon(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of the aggregators listing `id` as a child
    #[must_use]
    pub fn parent_ids(&self, id: &BeaconId) -> &[BeaconId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Aggregators listing `id` as a child
    #[must_use]
    pub fn list_parents(&self, id: &BeaconId) -> Vec<&Beacon> {
        self.parent_ids(id)
            .iter()
            .filter_map(|parent| self.get_beacon(parent))
            .collect()
    }

    /// Visible beacons that no aggregator lists as a child
    #[must_use]
    pub fn roots(&self) -> Vec<&Beacon> {
        self.beacons
            .iter()
            .filter(|b| b.visible && self.parent_ids(&b.id).is_empty())
            .collect()
    }

    /// Export catalog to JSON
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            organizations: self.organizations.clone(),
            beacons: self.beacons.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of beacons in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }
}

/// Leaves carry a strategy and no children; aggregators carry no strategy
fn check_shape(beacon: &Beacon) -> Result<(), CatalogError> {
    if beacon.aggregator {
        if beacon.strategy.is_some() {
            return Err(CatalogError::AggregatorWithStrategy(beacon.id.clone()));
        }
    } else {
        if beacon.strategy.is_none() {
            return Err(CatalogError::LeafWithoutStrategy(beacon.id.clone()));
        }
        if !beacon.children.is_empty() {
            return Err(CatalogError::LeafWithChildren(beacon.id.clone()));
        }
    }
    Ok(())
}
