//! Merging the previous and next keyed item sets.
//!
//! The merged order keeps every surviving key in `next` order, re-inserts each
//! removed key just before the survivor that followed it in `previous`, and
//! appends trailing removed keys at the end. Removed items therefore stay in
//! place while they play their exit transition.

use std::collections::HashMap;

use crate::children::ChildrenMap;
use crate::key::ItemKey;

/// How a key relates to the previous and next sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Only in `next`.
    New,
    /// Only in `previous`; kept for its exit transition.
    Removed,
    /// In both.
    Unchanged,
}

/// Classify a key from its presence in each set. `None` if in neither.
pub fn classify(in_previous: bool, in_next: bool) -> Option<Presence> {
    match (in_previous, in_next) {
        (false, true) => Some(Presence::New),
        (true, false) => Some(Presence::Removed),
        (true, true) => Some(Presence::Unchanged),
        (false, false) => None,
    }
}

/// Merge `previous` and `next` into one ordered set.
///
/// Keys in `next` take `next`'s value; keys only in `previous` keep their last
/// value.
pub fn merge<V: Clone>(previous: &ChildrenMap<V>, next: &ChildrenMap<V>) -> ChildrenMap<V> {
    merge_by(previous, next, |_, prev, next| next.or(prev).cloned())
}

/// Merge in display order, building each value with `resolve`.
///
/// `resolve` is called once per key of `previous ∪ next` in output order with
/// the key's value from each side. Returning `None` omits the key.
pub fn merge_by<P, N, V, F>(
    previous: &ChildrenMap<P>,
    next: &ChildrenMap<N>,
    mut resolve: F,
) -> ChildrenMap<V>
where
    F: FnMut(&ItemKey, Option<&P>, Option<&N>) -> Option<V>,
{
    // Removed keys waiting for the next surviving key in `previous` order.
    let mut pending: Vec<&ItemKey> = Vec::new();
    let mut pending_before: HashMap<&ItemKey, Vec<&ItemKey>> = HashMap::new();

    for key in previous.keys() {
        if next.contains_key(key) {
            if !pending.is_empty() {
                pending_before.insert(key, std::mem::take(&mut pending));
            }
        } else {
            pending.push(key);
        }
    }

    let mut merged = ChildrenMap::new();
    let mut emit = |key: &ItemKey, merged: &mut ChildrenMap<V>| {
        if let Some(value) = resolve(key, previous.get(key), next.get(key)) {
            merged.insert(key.clone(), value);
        }
    };

    for key in next.keys() {
        if let Some(run) = pending_before.get(key) {
            for removed in run {
                emit(removed, &mut merged);
            }
        }
        emit(key, &mut merged);
    }

    for removed in pending {
        emit(removed, &mut merged);
    }

    merged
}
