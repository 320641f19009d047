//! Per-item animation metadata and exit completion handles.
//!
//! Every cycle each merged item is wrapped in a fresh [`ItemDescriptor`]. The
//! item reads its metadata to drive its own enter/leave transition and calls
//! back with its [`ExitHandle`] once it has finished leaving.

use std::collections::HashMap;

use flips_config::FlipsConfig;
use serde::{Deserialize, Serialize};

use crate::children::ChildrenMap;
use crate::key::ItemKey;
use crate::reconcile::{Presence, classify, merge_by};

/// Token an item presents when its exit transition has finished.
///
/// Only the most recently issued handle for a key is honored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitHandle {
    pub key: ItemKey,
    pub generation: u64,
}

/// Issues exit handles and tracks which one is current per key.
#[derive(Debug, Default)]
pub struct ExitRegistry {
    current: HashMap<ItemKey, u64>,
    next_generation: u64,
}

impl ExitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle for `key`, superseding any earlier one.
    pub fn issue(&mut self, key: &ItemKey) -> ExitHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.current.insert(key.clone(), generation);
        ExitHandle {
            key: key.clone(),
            generation,
        }
    }

    pub fn is_current(&self, handle: &ExitHandle) -> bool {
        self.current.get(&handle.key) == Some(&handle.generation)
    }

    /// Consume `handle`. Succeeds once, and only for the current handle.
    pub fn settle(&mut self, handle: &ExitHandle) -> bool {
        if self.is_current(handle) {
            self.current.remove(&handle.key);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

/// Metadata injected into each item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Whether the item should play its enter animation.
    pub animation_enabled: bool,
    /// Class-name prefix for the item's own transition classes.
    pub name_prefix: String,
    /// Enter/leave duration hint in milliseconds.
    pub transition_duration: f64,
    /// Handle to report exit completion with.
    pub on_exit_complete: ExitHandle,
}

/// An item plus its injected metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor<T> {
    pub item: T,
    pub meta: ItemMeta,
}

impl<T> ItemDescriptor<T> {
    pub fn key(&self) -> &ItemKey {
        &self.meta.on_exit_complete.key
    }
}

fn fresh_meta(key: &ItemKey, config: &FlipsConfig, registry: &mut ExitRegistry) -> ItemMeta {
    ItemMeta {
        animation_enabled: true,
        name_prefix: config.prefix().to_string(),
        transition_duration: config.in_out_duration,
        on_exit_complete: registry.issue(key),
    }
}

/// Annotate every item of a freshly mounted list as new.
pub fn initial<T: Clone>(
    items: &ChildrenMap<T>,
    config: &FlipsConfig,
    registry: &mut ExitRegistry,
) -> ChildrenMap<ItemDescriptor<T>> {
    items
        .iter()
        .map(|(key, item)| {
            let descriptor = ItemDescriptor {
                item: item.clone(),
                meta: fresh_meta(key, config, registry),
            };
            (key.clone(), descriptor)
        })
        .collect()
}

/// Merge `next` into the annotated `previous` set.
///
/// - New items get fresh metadata and a fresh exit handle.
/// - Removed items keep rendering their last descriptor with the enter
///   animation disabled; their exit handle stays valid.
/// - Unchanged items take `next`'s content, carry the previous metadata
///   forward and get a new exit handle, invalidating the old one.
pub fn annotate<T: Clone>(
    previous: &ChildrenMap<ItemDescriptor<T>>,
    next: &ChildrenMap<T>,
    config: &FlipsConfig,
    registry: &mut ExitRegistry,
) -> ChildrenMap<ItemDescriptor<T>> {
    merge_by(previous, next, |key, prev, next| {
        match (classify(prev.is_some(), next.is_some())?, prev, next) {
            (Presence::New, _, Some(item)) => Some(ItemDescriptor {
                item: item.clone(),
                meta: fresh_meta(key, config, registry),
            }),
            (Presence::Removed, Some(prev), _) => {
                let mut descriptor = prev.clone();
                descriptor.meta.animation_enabled = false;
                Some(descriptor)
            }
            (Presence::Unchanged, Some(prev), Some(item)) => Some(ItemDescriptor {
                item: item.clone(),
                meta: ItemMeta {
                    on_exit_complete: registry.issue(key),
                    ..prev.meta.clone()
                },
            }),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(keys: &[&str]) -> ChildrenMap<String> {
        keys.iter()
            .map(|k| (ItemKey::from(*k), format!("item {k}")))
            .collect()
    }

    #[test]
    fn test_registry_supersedes_on_reissue() {
        let mut registry = ExitRegistry::new();
        let key = ItemKey::from("a");

        let first = registry.issue(&key);
        let second = registry.issue(&key);

        assert!(!registry.is_current(&first));
        assert!(registry.is_current(&second));
        assert!(!registry.settle(&first));
        assert!(registry.settle(&second));
        assert!(!registry.settle(&second));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_initial_items_are_enabled() {
        let config = FlipsConfig::default().with_in_out_duration(120.0);
        let mut registry = ExitRegistry::new();
        let annotated = initial(&items(&["a", "b"]), &config, &mut registry);

        for (key, descriptor) in &annotated {
            assert!(descriptor.meta.animation_enabled);
            assert_eq!(descriptor.meta.name_prefix, "r");
            assert_eq!(descriptor.meta.transition_duration, 120.0);
            assert_eq!(descriptor.key(), key);
            assert!(registry.is_current(&descriptor.meta.on_exit_complete));
        }
    }

    #[test]
    fn test_annotate_classes() {
        let config = FlipsConfig::default();
        let mut registry = ExitRegistry::new();
        let previous = initial(&items(&["a", "b"]), &config, &mut registry);
        let old_a = previous.get(&"a".into()).unwrap().meta.on_exit_complete.clone();
        let old_b = previous.get(&"b".into()).unwrap().meta.on_exit_complete.clone();

        let mut next = items(&["a", "c"]);
        next.insert("a".into(), "updated a".to_string());
        let merged = annotate(&previous, &next, &config, &mut registry);

        // `b` has no surviving successor, so it trails the new key.
        let keys: Vec<String> = merged.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);

        // Unchanged: new content, new handle, old handle stale.
        let a = merged.get(&"a".into()).unwrap();
        assert_eq!(a.item, "updated a");
        assert!(a.meta.animation_enabled);
        assert_ne!(a.meta.on_exit_complete, old_a);
        assert!(!registry.is_current(&old_a));

        // Removed: last content, animation disabled, handle still valid.
        let b = merged.get(&"b".into()).unwrap();
        assert_eq!(b.item, "item b");
        assert!(!b.meta.animation_enabled);
        assert_eq!(b.meta.on_exit_complete, old_b);
        assert!(registry.is_current(&old_b));

        // New: fresh metadata.
        let c = merged.get(&"c".into()).unwrap();
        assert!(c.meta.animation_enabled);
        assert!(registry.is_current(&c.meta.on_exit_complete));
    }

    #[test]
    fn test_unchanged_carries_previous_metadata() {
        let mut registry = ExitRegistry::new();
        let previous = initial(
            &items(&["a"]),
            &FlipsConfig::default().with_name("old").with_in_out_duration(80.0),
            &mut registry,
        );

        // A later config change does not re-derive metadata for existing items.
        let config = FlipsConfig::default().with_name("new").with_in_out_duration(500.0);
        let merged = annotate(&previous, &items(&["a", "b"]), &config, &mut registry);

        let a = merged.get(&"a".into()).unwrap();
        assert_eq!(a.meta.name_prefix, "old");
        assert_eq!(a.meta.transition_duration, 80.0);

        let b = merged.get(&"b".into()).unwrap();
        assert_eq!(b.meta.name_prefix, "new");
        assert_eq!(b.meta.transition_duration, 500.0);
    }

    #[test]
    fn test_readded_while_leaving_keeps_disabled_flag() {
        let config = FlipsConfig::default();
        let mut registry = ExitRegistry::new();
        let first = initial(&items(&["a", "b"]), &config, &mut registry);
        let leaving = annotate(&first, &items(&["a"]), &config, &mut registry);
        let back = annotate(&leaving, &items(&["a", "b"]), &config, &mut registry);

        assert!(!back.get(&"b".into()).unwrap().meta.animation_enabled);
    }
}
