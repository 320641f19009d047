//! The host tree seam.
//!
//! The engine never renders; it reads layout from and writes class/inline
//! style overrides to whatever retained tree the host commits items into.

use std::fmt::Debug;
use std::hash::Hash;

use crate::key::ItemKey;
use crate::rect::{Rect, RelativeRect};
use crate::transform::Transform2D;

/// A retained visual tree the animator can measure and restyle.
///
/// Lookups on unknown or detached elements degrade silently: reads return
/// `None`/`false`/`0`, writes do nothing.
pub trait VisualTree {
    type Element: Copy + Eq + Hash + Debug;

    /// Create a detached element with the given tag.
    fn create_element(&mut self, tag: &str) -> Option<Self::Element>;

    /// Descendants of `container` carrying an identity marker, in document
    /// order. Elements without a marker are not tracked.
    fn tracked_elements(&self, container: Self::Element) -> Vec<(Self::Element, ItemKey)>;

    /// Visual bounding box in scene space, including the current transform.
    /// Forces any pending layout.
    fn bounding_rect(&mut self, element: Self::Element) -> Option<Rect>;

    /// Reflow barrier: flush pending style and layout so every write so far
    /// is applied before anything that follows.
    fn reflow(&mut self);

    fn add_class(&mut self, element: Self::Element, class: &str);

    fn remove_class(&mut self, element: Self::Element, class: &str);

    fn has_class(&self, element: Self::Element, class: &str) -> bool;

    fn class_count(&self, element: Self::Element) -> usize;

    /// Drop the `class` attribute entirely.
    fn clear_class_attribute(&mut self, element: Self::Element);

    /// Inline `transform`; `None` clears the override.
    fn set_transform(&mut self, element: Self::Element, transform: Option<Transform2D>);

    /// Inline `transition-duration`; `None` clears the override.
    fn set_transition_duration(&mut self, element: Self::Element, duration_ms: Option<f32>);

    /// Whether `element` is still attached to the tree.
    fn is_connected(&self, element: Self::Element) -> bool;
}

/// Add a class. Surrounding whitespace is trimmed; blank names are ignored.
pub fn add_class<T: VisualTree + ?Sized>(tree: &mut T, element: T::Element, class: &str) {
    let class = class.trim();
    if class.is_empty() {
        return;
    }
    tree.add_class(element, class);
}

/// Remove a class, dropping the class attribute once no class is left.
/// Surrounding whitespace is trimmed; blank names are ignored.
pub fn remove_class<T: VisualTree + ?Sized>(tree: &mut T, element: T::Element, class: &str) {
    let class = class.trim();
    if class.is_empty() {
        return;
    }
    tree.remove_class(element, class);
    if tree.class_count(element) == 0 {
        tree.clear_class_attribute(element);
    }
}

/// Measure `element` against `container` behind a reflow barrier.
pub fn relative_rect<T: VisualTree + ?Sized>(
    tree: &mut T,
    container: T::Element,
    element: T::Element,
) -> Option<RelativeRect> {
    tree.reflow();
    let parent = tree.bounding_rect(container)?;
    let child = tree.bounding_rect(element)?;
    Some(RelativeRect::between(parent, child))
}
