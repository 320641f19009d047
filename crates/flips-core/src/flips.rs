//! The list controller the host drives.
//!
//! [`Flips`] owns the annotated children and the move animator. The host
//! feeds it new item lists, commits [`children`](Flips::children) to its tree
//! inside [`render`](Flips::render), forwards `transitionend` events and
//! reports finished exits.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use flips_config::FlipsConfig;
use tracing::{debug, info, warn};

use crate::animator::{FlipAnimator, FlipReport, MoveState};
use crate::children::{ChildrenMap, Keyed};
use crate::events::TransitionEnd;
use crate::key::ItemKey;
use crate::lifecycle::{ExitHandle, ExitRegistry, ItemDescriptor, annotate, initial};
use crate::tree::{VisualTree, add_class};

#[derive(Debug)]
pub struct Flips<T, E> {
    config: FlipsConfig,
    children: ChildrenMap<ItemDescriptor<T>>,
    registry: ExitRegistry,
    animator: FlipAnimator<E>,
    /// Keys kept on screen only until their exit completes.
    leaving: HashSet<ItemKey>,
    mounted: bool,
}

impl<T, E> Flips<T, E>
where
    T: Keyed + Clone,
    E: Copy + Eq + Hash + Debug,
{
    /// Annotate `items` as a first mount.
    pub fn new(config: FlipsConfig, items: impl IntoIterator<Item = T>) -> Self {
        let mut registry = ExitRegistry::new();
        let children = initial(&ChildrenMap::from_items(items), &config, &mut registry);
        let animator = FlipAnimator::new(config.move_class());
        info!(
            items = children.len(),
            move_class = animator.move_class(),
            "flips list created"
        );
        Self {
            config,
            children,
            registry,
            animator,
            leaving: HashSet::new(),
            mounted: false,
        }
    }

    pub fn config(&self) -> &FlipsConfig {
        &self.config
    }

    /// Ordered descriptors to commit, leaving items included.
    pub fn children(&self) -> &ChildrenMap<ItemDescriptor<T>> {
        &self.children
    }

    pub fn animator(&self) -> &FlipAnimator<E> {
        &self.animator
    }

    pub fn move_state(&self, key: &ItemKey) -> MoveState {
        self.animator.move_state(key)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_leaving(&self, key: &ItemKey) -> bool {
        self.leaving.contains(key)
    }

    /// Keys waiting for their exit to complete, in display order.
    pub fn leaving(&self) -> Vec<&ItemKey> {
        self.children
            .keys()
            .filter(|key| self.leaving.contains(*key))
            .collect()
    }

    /// Replace the item list. Items missing from `items` stay in place,
    /// flagged as leaving, until their exit completes.
    pub fn set_children(&mut self, items: impl IntoIterator<Item = T>) {
        let next = ChildrenMap::from_items(items);
        let merged = annotate(&self.children, &next, &self.config, &mut self.registry);

        self.leaving = merged
            .keys()
            .filter(|key| !next.contains_key(key))
            .cloned()
            .collect();
        debug!(
            items = next.len(),
            rendered = merged.len(),
            leaving = self.leaving.len(),
            "children updated"
        );
        self.children = merged;
    }

    /// An item finished leaving. Drops it from the children when `handle`
    /// is the current one for its key; stale or repeated handles are ignored.
    ///
    /// The host re-renders afterwards so remaining siblings can move into the
    /// freed space.
    pub fn exit_complete(&mut self, handle: &ExitHandle) -> bool {
        if !self.registry.settle(handle) {
            debug!(key = %handle.key, generation = handle.generation, "ignoring stale exit handle");
            return false;
        }
        self.children.remove(&handle.key);
        self.leaving.remove(&handle.key);
        debug!(key = %handle.key, "exit complete");
        true
    }

    /// Create the wrapping container element.
    pub fn mount<V>(&self, tree: &mut V) -> Option<E>
    where
        V: VisualTree<Element = E> + ?Sized,
    {
        let Some(container) = tree.create_element(&self.config.wrap) else {
            warn!(tag = %self.config.wrap, "host refused to create the wrap element");
            return None;
        };
        add_class(tree, container, &self.config.wrap_class);
        Some(container)
    }

    /// Run one render cycle around the host's `commit`.
    ///
    /// The first call only commits; the animator starts measuring from the
    /// second call on.
    pub fn render<V, F>(&mut self, tree: &mut V, container: E, commit: F) -> FlipReport
    where
        V: VisualTree<Element = E> + ?Sized,
        F: FnOnce(&mut V, &ChildrenMap<ItemDescriptor<T>>),
    {
        if self.mounted {
            self.animator.capture(&mut *tree, container);
        }

        commit(&mut *tree, &self.children);

        if !self.mounted {
            self.mounted = true;
            debug!(items = self.children.len(), "first mount committed");
            return FlipReport::default();
        }
        self.animator.play(tree, container)
    }

    /// Forward a `transitionend` that reached `current_target`.
    pub fn on_transition_end<V>(
        &mut self,
        tree: &mut V,
        current_target: E,
        event: &TransitionEnd<E>,
    ) -> bool
    where
        V: VisualTree<Element = E> + ?Sized,
    {
        self.animator
            .handle_transition_end(tree, current_target, event)
    }

    pub fn exit_handle(&self, key: &ItemKey) -> Option<&ExitHandle> {
        self.children
            .get(key)
            .map(|descriptor| &descriptor.meta.on_exit_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ChildSpec, NodeId, SceneTree};

    #[derive(Debug, Clone, PartialEq)]
    struct Card(&'static str);

    impl Keyed for Card {
        fn key(&self) -> Option<ItemKey> {
            Some(ItemKey::from(self.0))
        }
    }

    fn cards(keys: &[&'static str]) -> Vec<Card> {
        keys.iter().map(|k| Card(*k)).collect()
    }

    fn commit(tree: &mut SceneTree, container: NodeId, children: &ChildrenMap<ItemDescriptor<Card>>) {
        let specs: Vec<ChildSpec> = children
            .keys()
            .map(|key| ChildSpec::new(key.clone(), 100.0, 20.0))
            .collect();
        tree.commit_children(container, &specs).unwrap();
    }

    #[test]
    fn test_removed_items_stay_until_exit_complete() {
        let mut flips: Flips<Card, NodeId> = Flips::new(FlipsConfig::default(), cards(&["a", "b", "c"]));
        flips.set_children(cards(&["a", "c"]));

        let keys: Vec<&ItemKey> = flips.children().keys().collect();
        assert_eq!(keys, vec![&ItemKey::from("a"), &ItemKey::from("b"), &ItemKey::from("c")]);
        assert!(flips.is_leaving(&ItemKey::from("b")));
        assert!(!flips.children().get(&ItemKey::from("b")).unwrap().meta.animation_enabled);

        let handle = flips.exit_handle(&ItemKey::from("b")).unwrap().clone();
        assert!(flips.exit_complete(&handle));
        assert!(!flips.exit_complete(&handle));
        assert_eq!(flips.children().len(), 2);
        assert!(flips.leaving().is_empty());
    }

    #[test]
    fn test_stale_handle_after_rebind_is_rejected() {
        let mut flips: Flips<Card, NodeId> = Flips::new(FlipsConfig::default(), cards(&["a"]));
        let stale = flips.exit_handle(&ItemKey::from("a")).unwrap().clone();
        flips.set_children(cards(&["a"]));

        assert!(!flips.exit_complete(&stale));
        assert!(flips.children().contains_key(&ItemKey::from("a")));
    }

    #[test]
    fn test_mount_creates_wrap_element() {
        let mut scene = SceneTree::new(200.0, 200.0).unwrap();
        let config = FlipsConfig::default().with_wrap("ul").with_wrap_class("cards");
        let flips: Flips<Card, NodeId> = Flips::new(config, cards(&[]));

        let container = flips.mount(&mut scene).unwrap();
        assert_eq!(scene.tag(container), Some("ul"));
        assert_eq!(scene.class_attribute(container).as_deref(), Some("cards"));
    }

    #[test]
    fn test_first_render_only_commits() {
        let mut scene = SceneTree::new(200.0, 200.0).unwrap();
        let mut flips: Flips<Card, NodeId> = Flips::new(FlipsConfig::default(), cards(&["a", "b"]));
        let container = flips.mount(&mut scene).unwrap();
        scene.append_child(scene.root(), container).unwrap();

        let report = flips.render(&mut scene, container, |tree, children| commit(tree, container, children));
        assert_eq!(report, FlipReport::default());
        assert!(flips.is_mounted());
        assert!(flips.animator().prior().is_none());

        flips.set_children(cards(&["b", "a"]));
        let report = flips.render(&mut scene, container, |tree, children| commit(tree, container, children));
        assert_eq!(report.measured, 2);
        assert_eq!(report.moved.len(), 2);
    }
}
