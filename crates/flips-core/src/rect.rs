//! Item positions relative to their container.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::key::ItemKey;

/// An axis-aligned bounding box in scene space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An item's box expressed against its container.
///
/// The offset is `container - item`, so a later position minus an earlier one
/// is already the displacement that undoes the move.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativeRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RelativeRect {
    pub fn between(container: Rect, item: Rect) -> Self {
        Self {
            x: container.x - item.x,
            y: container.y - item.y,
            width: item.width,
            height: item.height,
        }
    }

    /// `(self - earlier)` on both axes.
    pub fn delta_from(&self, earlier: &RelativeRect) -> (f32, f32) {
        (self.x - earlier.x, self.y - earlier.y)
    }
}

/// Positions of tracked items just before the last commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectSnapshot {
    rects: HashMap<ItemKey, RelativeRect>,
}

impl RectSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ItemKey, rect: RelativeRect) {
        self.rects.insert(key, rect);
    }

    pub fn get(&self, key: &ItemKey) -> Option<&RelativeRect> {
        self.rects.get(key)
    }

    /// Record `rect` for `key` unless an entry exists. Returns true if seeded.
    pub fn seed(&mut self, key: &ItemKey, rect: RelativeRect) -> bool {
        if self.rects.contains_key(key) {
            return false;
        }
        self.rects.insert(key.clone(), rect);
        true
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_rect_is_container_minus_item() {
        let container = Rect::new(10.0, 20.0, 300.0, 400.0);
        let item = Rect::new(15.0, 70.0, 100.0, 40.0);

        let rel = RelativeRect::between(container, item);
        assert_eq!(rel.x, -5.0);
        assert_eq!(rel.y, -50.0);
        assert_eq!(rel.width, 100.0);
        assert_eq!(rel.height, 40.0);
    }

    #[test]
    fn test_delta_is_inverse_displacement() {
        let container = Rect::new(0.0, 0.0, 300.0, 300.0);
        let before = RelativeRect::between(container, Rect::new(0.0, 100.0, 50.0, 50.0));
        let after = RelativeRect::between(container, Rect::new(0.0, 0.0, 50.0, 50.0));

        // Moved up by 100, so the inverting offset is +100.
        assert_eq!(after.delta_from(&before), (0.0, 100.0));
    }

    #[test]
    fn test_seed_only_fills_missing() {
        let mut snapshot = RectSnapshot::new();
        let key = ItemKey::from("a");
        let first = RelativeRect { x: 1.0, ..Default::default() };
        let second = RelativeRect { x: 2.0, ..Default::default() };

        assert!(snapshot.seed(&key, first));
        assert!(!snapshot.seed(&key, second));
        assert_eq!(snapshot.get(&key), Some(&first));
    }
}
