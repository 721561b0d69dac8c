//! Traversals over the aggregator → child relation.
//!
//! The relation is a DAG: a beacon may sit under several aggregators, but no
//! beacon may reach itself. All walks here use explicit stacks so their depth
//! is bounded by heap, not by the call stack.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::catalog::store::BeaconCatalog;
use crate::core::types::BeaconId;

/// Find a beacon lying on a cycle of the child relation, if there is one.
///
/// Runs Kahn's algorithm to peel off every beacon not involved with a cycle,
/// then walks the remainder until a beacon repeats. Unknown child ids are
/// ignored; the catalog reports them separately.
#[must_use]
pub fn find_cycle(catalog: &BeaconCatalog) -> Option<BeaconId> {
    let mut in_degree: HashMap<&BeaconId, usize> =
        catalog.beacons().iter().map(|b| (&b.id, 0)).collect();
    for beacon in catalog.beacons() {
        for child in &beacon.children {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree += 1;
            }
        }
    }

    let mut ready: Vec<&BeaconId> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&id, _)| id)
        .collect();

    while let Some(id) = ready.pop() {
        let Some(beacon) = catalog.get_beacon(id) else {
            continue;
        };
        for child in &beacon.children {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(child);
                }
            }
        }
    }

    // Whatever keeps a positive in-degree is on a cycle or downstream of one.
    let remaining: BTreeSet<&BeaconId> = in_degree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(id, _)| id)
        .collect();

    let mut current = *remaining.iter().next()?;
    let mut seen: HashSet<&BeaconId> = HashSet::new();
    // Every remaining beacon has a remaining parent, so walking parents
    // never leaves the set and must eventually revisit a beacon.
    loop {
        if !seen.insert(current) {
            return Some(current.clone());
        }
        current = catalog
            .parent_ids(current)
            .iter()
            .find(|p| remaining.contains(p))?;
    }
}

/// Beacons reachable from `targets` (targets included), children before
/// parents, each exactly once.
///
/// Disabled children are not followed. Ids the catalog does not know are
/// skipped.
#[must_use]
pub fn post_order(catalog: &BeaconCatalog, targets: &[BeaconId]) -> Vec<BeaconId> {
    let mut order = Vec::new();
    let mut visited: HashSet<&BeaconId> = HashSet::new();
    // (beacon, children already pushed)
    let mut stack: Vec<(&BeaconId, bool)> = Vec::new();

    for target in targets.iter().rev() {
        let Some(beacon) = catalog.get_beacon(target) else {
            continue;
        };
        stack.push((&beacon.id, false));

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id.clone());
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            for child in enabled_children(catalog, id).into_iter().rev() {
                if !visited.contains(child) {
                    stack.push((child, false));
                }
            }
        }
    }

    order
}

/// Enabled children of `id` that exist in the catalog, in id order
#[must_use]
pub fn enabled_children<'a>(catalog: &'a BeaconCatalog, id: &BeaconId) -> Vec<&'a BeaconId> {
    catalog
        .list_children(id)
        .into_iter()
        .filter(|b| b.enabled)
        .map(|b| &b.id)
        .collect()
}

/// Leaf beacons reachable from `id`, in post-order
#[must_use]
pub fn leaf_descendants(catalog: &BeaconCatalog, id: &BeaconId) -> Vec<BeaconId> {
    post_order(catalog, std::slice::from_ref(id))
        .into_iter()
        .filter(|b| catalog.get_beacon(b).is_some_and(|beacon| !beacon.aggregator))
        .collect()
}

/// Pre-order listing with depths, for printing the hierarchy as a tree.
///
/// Unlike [`post_order`] a beacon under several aggregators is listed under
/// each of them.
#[must_use]
pub fn tree_lines(catalog: &BeaconCatalog, root: &BeaconId) -> Vec<(usize, BeaconId)> {
    let mut lines = Vec::new();
    let mut stack = vec![(0usize, root)];

    while let Some((depth, id)) = stack.pop() {
        let Some(beacon) = catalog.get_beacon(id) else {
            continue;
        };
        lines.push((depth, beacon.id.clone()));
        for child in beacon.children.iter().rev() {
            stack.push((depth + 1, child));
        }
    }

    lines
}
