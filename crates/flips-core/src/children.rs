//! Ordered keyed item sets.

use indexmap::IndexMap;
use indexmap::map::{Iter, Keys, Values};

use crate::key::ItemKey;

/// Something that can appear in a keyed list.
///
/// Items without a key are not part of the keyed set.
pub trait Keyed {
    fn key(&self) -> Option<ItemKey>;
}

/// Ordered mapping from item key to item. Insertion order is screen order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildrenMap<V> {
    entries: IndexMap<ItemKey, V>,
}

impl<V> Default for ChildrenMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> ChildrenMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a keyed set from items in order.
    ///
    /// Unkeyed items are skipped. For duplicate keys the last value wins and
    /// keeps the position of the first occurrence.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Keyed,
    {
        let mut map = Self::new();
        for item in items {
            match item.key() {
                Some(key) => {
                    if map.entries.contains_key(&key) {
                        tracing::warn!(key = %key, "duplicate item key; last value wins");
                    }
                    map.entries.insert(key, item);
                }
                None => tracing::debug!("skipping unkeyed item"),
            }
        }
        map
    }

    /// Insert or replace the value for `key`. A new key is appended.
    pub fn insert(&mut self, key: ItemKey, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &ItemKey) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &ItemKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, ItemKey, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> Values<'_, ItemKey, V> {
        self.entries.values()
    }

    pub fn iter(&self) -> Iter<'_, ItemKey, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> FromIterator<(ItemKey, V)> for ChildrenMap<V> {
    fn from_iter<I: IntoIterator<Item = (ItemKey, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a ChildrenMap<V> {
    type Item = (&'a ItemKey, &'a V);
    type IntoIter = Iter<'a, ItemKey, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
