//! Merge a delta batch into a base snapshot.

use std::collections::{HashMap, HashSet};

use maz_core::{EntitySnapshot, RemoteObject};

/// Apply `delta` to `base`.
///
/// Tombstoned ids (removals and membership-only records) are dropped from the
/// base. Live records are deduplicated by id, first occurrence winning; each
/// one either updates the base record with the same id in place (shallow
/// merge) or is appended in arrival order.
#[must_use]
pub fn reconcile(base: EntitySnapshot, delta: Vec<RemoteObject>) -> EntitySnapshot {
    let (tombstones, live): (Vec<_>, Vec<_>) = delta.into_iter().partition(RemoteObject::is_tombstone);
    let removed: HashSet<String> = tombstones.into_iter().map(|x| x.id).collect();

    let mut merged: EntitySnapshot = base
        .into_iter()
        .filter(|x| !removed.contains(&x.id))
        .collect();
    let mut position: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, x)| (x.id.clone(), i))
        .collect();

    let mut seen = HashSet::new();
    for record in live {
        if !seen.insert(record.id.clone()) {
            continue;
        }
        match position.get(&record.id) {
            Some(&i) => merged[i].merge_from(record),
            None => {
                position.insert(record.id.clone(), merged.len());
                merged.push(record);
            }
        }
    }
    merged
}
