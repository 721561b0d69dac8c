//! Snapshot handle separating query serving from catalog administration.
//!
//! Queries call [`SharedCatalog::snapshot`] once and read the returned `Arc`
//! for their whole lifetime. Updates build a new validated catalog from a
//! copy and swap it in; snapshots already handed out never change.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::catalog::store::{BeaconCatalog, CatalogError};
use crate::core::beacon::Beacon;
use crate::core::types::BeaconId;

#[derive(Debug)]
pub struct SharedCatalog {
    current: RwLock<Arc<BeaconCatalog>>,
    /// Serializes writers so the read lock is only contended during the swap
    update: Mutex<()>,
}

impl SharedCatalog {
    #[must_use]
    pub fn new(catalog: BeaconCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
            update: Mutex::new(()),
        }
    }

    /// The catalog as of now
    #[must_use]
    pub fn snapshot(&self) -> Arc<BeaconCatalog> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a whole new catalog after validating it
    pub fn replace(&self, catalog: BeaconCatalog) -> Result<(), CatalogError> {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        catalog.validate()?;
        self.swap(catalog);
        Ok(())
    }

    /// Add or replace one beacon
    pub fn upsert_beacon(&self, beacon: Beacon) -> Result<(), CatalogError> {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*self.snapshot()).clone();
        let id = beacon.id.clone();
        next.upsert_beacon(beacon)?;
        next.validate()?;
        self.swap(next);
        tracing::info!(beacon = %id, "Updated beacon in catalog");
        Ok(())
    }

    /// Remove one beacon and its child links
    pub fn remove_beacon(&self, id: &BeaconId) -> Result<Beacon, CatalogError> {
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = (*self.snapshot()).clone();
        let removed = next.remove_beacon(id)?;
        next.validate()?;
        self.swap(next);
        tracing::info!(beacon = %id, "Removed beacon from catalog");
        Ok(removed)
    }

    fn swap(&self, catalog: BeaconCatalog) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(catalog);
    }
}
