//! In-memory retained scene tree.
//!
//! A small stand-in for a browser document: elements with class lists and
//! inline `transform`/`transition-duration` overrides, flex layout through
//! taffy, and a transition clock that delivers `transitionend` the way a
//! style engine would. Cancelled transitions end silently.
//!
//! Style changes are not applied when they are written. They are flushed at
//! the next [`reflow`](VisualTree::reflow), measurement or clock tick, so a
//! write followed by another write to the same element before a flush never
//! starts a transition from the intermediate value.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use taffy::prelude::{
    AvailableSpace, Dimension, Display, FlexDirection as LayoutDirection, LengthPercentage,
    NodeId as LayoutNode, Size, Style, TaffyTree,
};
use tracing::{trace, warn};

use crate::class_list::ClassList;
use crate::error::{Result, TreeError};
use crate::events::TransitionEnd;
use crate::key::ItemKey;
use crate::rect::Rect;
use crate::transform::Transform2D;
use crate::transition::TransitionSpec;
use crate::tree::VisualTree;

const TRANSFORM: &str = "transform";

/// Handle to an element of a [`SceneTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackDirection {
    #[default]
    Column,
    Row,
}

impl From<StackDirection> for LayoutDirection {
    fn from(direction: StackDirection) -> Self {
        match direction {
            StackDirection::Column => LayoutDirection::Column,
            StackDirection::Row => LayoutDirection::Row,
        }
    }
}

/// One keyed child for [`SceneTree::commit_children`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSpec {
    pub key: ItemKey,
    /// Whether the element carries the identity marker the animator tracks.
    pub tracked: bool,
    pub width: f32,
    pub height: f32,
}

impl ChildSpec {
    pub fn new(key: impl Into<ItemKey>, width: f32, height: f32) -> Self {
        Self {
            key: key.into(),
            tracked: true,
            width,
            height,
        }
    }

    /// Commit the element without an identity marker.
    pub fn untracked(mut self) -> Self {
        self.tracked = false;
        self
    }
}

/// A style write or barrier, in the order it was issued.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeOp {
    AddClass {
        node: NodeId,
        class: String,
    },
    RemoveClass {
        node: NodeId,
        class: String,
    },
    SetTransform {
        node: NodeId,
        transform: Option<Transform2D>,
    },
    SetTransitionDuration {
        node: NodeId,
        duration_ms: Option<f32>,
    },
    Reflow,
}

#[derive(Debug, Clone)]
struct TransformTransition {
    from: Transform2D,
    to: Transform2D,
    delay_ms: f32,
    duration_ms: f32,
    elapsed_ms: f32,
}

impl TransformTransition {
    fn new(from: Transform2D, to: Transform2D, delay_ms: f32, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            delay_ms,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((self.elapsed_ms - self.delay_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    fn current(&self) -> Transform2D {
        self.from.lerp(&self.to, self.progress())
    }

    fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.delay_ms + self.duration_ms
    }
}

#[derive(Debug, Clone)]
struct PropertyTransition {
    property_name: String,
    duration_ms: f32,
    elapsed_ms: f32,
}

#[derive(Debug)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: LayoutNode,
    style: Style,
    marker: Option<ItemKey>,
    /// `None` means no `class` attribute at all.
    classes: Option<ClassList>,
    inline_transform: Option<Transform2D>,
    inline_duration_ms: Option<f32>,
    /// Resolved end value of `transform`.
    computed_transform: Transform2D,
    transform_transition: Option<TransformTransition>,
    property_transitions: Vec<PropertyTransition>,
}

impl Element {
    fn visual_transform(&self) -> Transform2D {
        self.transform_transition
            .as_ref()
            .map(TransformTransition::current)
            .unwrap_or(self.computed_transform)
    }
}

fn container_style(direction: StackDirection, gap: f32, padding: f32) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: direction.into(),
        flex_shrink: 0.0,
        gap: Size {
            width: LengthPercentage::Length(gap),
            height: LengthPercentage::Length(gap),
        },
        padding: taffy::Rect {
            left: LengthPercentage::Length(padding),
            right: LengthPercentage::Length(padding),
            top: LengthPercentage::Length(padding),
            bottom: LengthPercentage::Length(padding),
        },
        ..Default::default()
    }
}

fn layout_error(err: impl fmt::Display) -> TreeError {
    TreeError::Layout(err.to_string())
}

/// Retained element tree with flex layout and simulated transitions.
pub struct SceneTree {
    taffy: TaffyTree<()>,
    elements: BTreeMap<NodeId, Element>,
    root: NodeId,
    next_id: u32,
    viewport: Size<f32>,
    rules: HashMap<String, Vec<TransitionSpec>>,
    keyed: HashMap<NodeId, HashMap<ItemKey, NodeId>>,
    layout_dirty: bool,
    style_dirty: HashSet<NodeId>,
    ops: Vec<TreeOp>,
}

impl fmt::Debug for SceneTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneTree")
            .field("root", &self.root)
            .field("elements", &self.elements.len())
            .field("viewport", &(self.viewport.width, self.viewport.height))
            .finish()
    }
}

impl SceneTree {
    /// Create a tree whose root fills a `width` x `height` viewport.
    pub fn new(width: f32, height: f32) -> Result<Self> {
        let mut scene = Self {
            taffy: TaffyTree::new(),
            elements: BTreeMap::new(),
            root: NodeId(0),
            next_id: 0,
            viewport: Size { width, height },
            rules: HashMap::new(),
            keyed: HashMap::new(),
            layout_dirty: true,
            style_dirty: HashSet::new(),
            ops: Vec::new(),
        };
        let root = scene.create("body")?;
        scene.root = root;
        scene.update_style(root, |style| {
            style.size = Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            };
        })?;
        Ok(scene)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element. It lays out as a column flex container.
    pub fn create(&mut self, tag: &str) -> Result<NodeId> {
        let style = container_style(StackDirection::Column, 0.0, 0.0);
        let layout = self.taffy.new_leaf(style.clone()).map_err(layout_error)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.elements.insert(
            id,
            Element {
                tag: tag.to_string(),
                parent: None,
                children: Vec::new(),
                layout,
                style,
                marker: None,
                classes: None,
                inline_transform: None,
                inline_duration_ms: None,
                computed_transform: Transform2D::identity(),
                transform_transition: None,
                property_transitions: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }

        let old_parent = self.detach(child);
        if let Some(el) = self.elements.get_mut(&parent) {
            el.children.push(child);
        }
        if let Some(el) = self.elements.get_mut(&child) {
            el.parent = Some(parent);
        }
        if let Some(old) = old_parent.filter(|old| *old != parent) {
            self.sync_layout_children(old)?;
        }
        self.sync_layout_children(parent)?;
        Ok(())
    }

    /// Destroy `node` and its subtree. Transitions running inside it vanish
    /// without an end or cancel event.
    pub fn remove_element(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(TreeError::RootRemoval);
        }
        self.element(node)?;

        if let Some(parent) = self.detach(node) {
            self.sync_layout_children(parent)?;
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(el) = self.elements.remove(&id) else {
                continue;
            };
            stack.extend(el.children.iter().copied());
            self.taffy.remove(el.layout).map_err(layout_error)?;
            self.style_dirty.remove(&id);
            self.keyed.remove(&id);
        }
        for entries in self.keyed.values_mut() {
            entries.retain(|_, id| self.elements.contains_key(id));
        }
        trace!(node = %node, "removed element");
        Ok(())
    }

    /// Lay `node`'s children out along `direction`.
    pub fn set_stack(
        &mut self,
        node: NodeId,
        direction: StackDirection,
        gap: f32,
        padding: f32,
    ) -> Result<()> {
        let base = container_style(direction, gap, padding);
        self.update_style(node, |style| {
            style.flex_direction = base.flex_direction;
            style.gap = base.gap;
            style.padding = base.padding;
        })
    }

    pub fn set_size(&mut self, node: NodeId, width: f32, height: f32) -> Result<()> {
        self.update_style(node, |style| {
            style.size = Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            };
        })
    }

    /// Set or clear the identity marker that makes `node` tracked.
    pub fn set_marker(&mut self, node: NodeId, key: Option<ItemKey>) -> Result<()> {
        self.element_mut(node)?.marker = key;
        Ok(())
    }

    /// Register a transition rule for elements carrying `class`. Later rules
    /// win over earlier ones for the same property.
    pub fn add_transition_rule(&mut self, class: impl Into<String>, spec: TransitionSpec) {
        self.rules.entry(class.into()).or_default().push(spec);
        self.style_dirty.extend(self.elements.keys().copied());
    }

    /// Keyed commit: make `container`'s keyed children exactly `specs`, in
    /// order. Elements are reused by key, created for new keys and destroyed
    /// for keys that are gone. Unkeyed children stay after the keyed ones.
    pub fn commit_children(&mut self, container: NodeId, specs: &[ChildSpec]) -> Result<Vec<NodeId>> {
        self.element(container)?;

        let mut ordered = Vec::with_capacity(specs.len());
        for spec in specs {
            let existing = self
                .keyed
                .get(&container)
                .and_then(|entries| entries.get(&spec.key))
                .copied()
                .filter(|id| self.elements.contains_key(id));
            let node = match existing {
                Some(node) => node,
                None => {
                    let node = self.create("div")?;
                    self.keyed
                        .entry(container)
                        .or_default()
                        .insert(spec.key.clone(), node);
                    node
                }
            };
            self.set_size(node, spec.width, spec.height)?;
            self.set_marker(node, spec.tracked.then(|| spec.key.clone()))?;
            ordered.push(node);
        }

        let stale: Vec<NodeId> = self
            .keyed
            .get(&container)
            .map(|entries| {
                entries
                    .values()
                    .copied()
                    .filter(|id| !ordered.contains(id))
                    .collect()
            })
            .unwrap_or_default();
        for node in stale {
            self.remove_element(node)?;
        }

        for node in &ordered {
            if let Some(old) = self.detach(*node).filter(|old| *old != container) {
                self.sync_layout_children(old)?;
            }
            if let Some(el) = self.elements.get_mut(node) {
                el.parent = Some(container);
            }
        }
        if let Some(el) = self.elements.get_mut(&container) {
            let unkeyed: Vec<NodeId> = el.children.drain(..).collect();
            el.children = ordered.clone();
            el.children.extend(unkeyed);
        }
        self.sync_layout_children(container)?;

        trace!(container = %container, children = ordered.len(), "committed keyed children");
        Ok(ordered)
    }

    /// Element committed under `container` for `key`.
    pub fn element_for_key(&self, container: NodeId, key: &ItemKey) -> Option<NodeId> {
        self.keyed.get(&container)?.get(key).copied()
    }

    /// Start a transition of a property other than `transform`, such as an
    /// opacity fade. Returns false for unknown nodes or a zero duration.
    pub fn start_property_transition(
        &mut self,
        node: NodeId,
        property_name: &str,
        duration_ms: f32,
    ) -> bool {
        if duration_ms <= 0.0 || !VisualTree::is_connected(self, node) {
            return false;
        }
        let Some(el) = self.elements.get_mut(&node) else {
            return false;
        };
        if let Some(pos) = el
            .property_transitions
            .iter()
            .position(|t| t.property_name == property_name)
        {
            el.property_transitions.remove(pos);
        }
        el.property_transitions.push(PropertyTransition {
            property_name: property_name.to_string(),
            duration_ms,
            elapsed_ms: 0.0,
        });
        true
    }

    /// Run the transition clock forward by `delta_ms`.
    ///
    /// Returns every `transitionend` delivery in dispatch order: each event
    /// bubbles from its target up to the root, one `(current_target, event)`
    /// pair per element on the way.
    pub fn advance(&mut self, delta_ms: f32) -> Vec<(NodeId, TransitionEnd<NodeId>)> {
        self.flush();

        let mut finished = Vec::new();
        for (id, el) in self.elements.iter_mut() {
            let done = match el.transform_transition.as_mut() {
                Some(run) => {
                    run.elapsed_ms += delta_ms;
                    run.is_finished().then(|| (run.to, run.duration_ms))
                }
                None => None,
            };
            if let Some((to, duration_ms)) = done {
                el.transform_transition = None;
                el.computed_transform = to;
                finished.push(TransitionEnd {
                    target: *id,
                    property_name: TRANSFORM.to_string(),
                    elapsed_ms: duration_ms,
                });
            }

            el.property_transitions.retain_mut(|run| {
                run.elapsed_ms += delta_ms;
                if run.elapsed_ms < run.duration_ms {
                    return true;
                }
                finished.push(TransitionEnd {
                    target: *id,
                    property_name: run.property_name.clone(),
                    elapsed_ms: run.duration_ms,
                });
                false
            });
        }

        let mut deliveries = Vec::new();
        for end in finished {
            let mut current = Some(end.target);
            while let Some(node) = current {
                deliveries.push((node, end.clone()));
                current = self.elements.get(&node).and_then(|el| el.parent);
            }
        }
        deliveries
    }

    /// Style writes and barriers issued since the last clear.
    pub fn op_log(&self) -> &[TreeOp] {
        &self.ops
    }

    pub fn clear_op_log(&mut self) {
        self.ops.clear();
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.elements.get(&node).map(|el| el.tag.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.elements
            .get(&node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn marker(&self, node: NodeId) -> Option<&ItemKey> {
        self.elements.get(&node)?.marker.as_ref()
    }

    /// The `class` attribute, or `None` when the element has none.
    pub fn class_attribute(&self, node: NodeId) -> Option<String> {
        self.elements
            .get(&node)?
            .classes
            .as_ref()
            .map(ClassList::to_attribute)
    }

    pub fn inline_transform(&self, node: NodeId) -> Option<Transform2D> {
        self.elements.get(&node)?.inline_transform
    }

    pub fn inline_transition_duration(&self, node: NodeId) -> Option<f32> {
        self.elements.get(&node)?.inline_duration_ms
    }

    /// Transform currently painted, mid-transition values included.
    pub fn visual_transform(&mut self, node: NodeId) -> Option<Transform2D> {
        self.flush();
        self.elements.get(&node).map(Element::visual_transform)
    }

    pub fn is_transitioning(&mut self, node: NodeId) -> bool {
        self.flush();
        self.elements.get(&node).is_some_and(|el| {
            el.transform_transition.is_some() || !el.property_transitions.is_empty()
        })
    }

    /// Layout box in scene space, ignoring transforms.
    pub fn layout_rect(&mut self, node: NodeId) -> Option<Rect> {
        self.flush();
        if !VisualTree::is_connected(self, node) {
            return None;
        }
        self.absolute_rect(node, false)
    }

    fn element(&self, node: NodeId) -> Result<&Element> {
        self.elements
            .get(&node)
            .ok_or(TreeError::UnknownElement(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        self.elements
            .get_mut(&node)
            .ok_or(TreeError::UnknownElement(node))
    }

    fn update_style(&mut self, node: NodeId, edit: impl FnOnce(&mut Style)) -> Result<()> {
        let el = self
            .elements
            .get_mut(&node)
            .ok_or(TreeError::UnknownElement(node))?;
        edit(&mut el.style);
        self.taffy
            .set_style(el.layout, el.style.clone())
            .map_err(layout_error)?;
        self.layout_dirty = true;
        Ok(())
    }

    /// Unlink `node` from its parent's child list. Returns the old parent.
    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.elements.get_mut(&node)?.parent.take()?;
        if let Some(el) = self.elements.get_mut(&parent) {
            el.children.retain(|c| *c != node);
        }
        Some(parent)
    }

    fn sync_layout_children(&mut self, node: NodeId) -> Result<()> {
        let el = self.element(node)?;
        let parent_layout = el.layout;
        let layouts: Vec<LayoutNode> = el
            .children
            .iter()
            .filter_map(|c| self.elements.get(c).map(|child| child.layout))
            .collect();
        self.taffy
            .set_children(parent_layout, &layouts)
            .map_err(layout_error)?;
        self.layout_dirty = true;
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements.get(&id).and_then(|el| el.parent);
        }
        false
    }

    fn flush(&mut self) {
        self.flush_styles();
        if let Err(err) = self.flush_layout() {
            warn!(error = %err, "layout pass failed");
        }
    }

    fn flush_layout(&mut self) -> Result<()> {
        if !self.layout_dirty {
            return Ok(());
        }
        let root = self.element(self.root)?.layout;
        self.taffy
            .compute_layout(
                root,
                Size {
                    width: AvailableSpace::Definite(self.viewport.width),
                    height: AvailableSpace::Definite(self.viewport.height),
                },
            )
            .map_err(layout_error)?;
        self.layout_dirty = false;
        Ok(())
    }

    /// Duration and delay that apply to `property_name` on `node`. An inline
    /// duration overrides whatever the class rules say.
    fn effective_transition(&self, node: NodeId, property_name: &str) -> (f32, f32) {
        let Some(el) = self.elements.get(&node) else {
            return (0.0, 0.0);
        };
        let rule = el
            .classes
            .iter()
            .flat_map(|classes| classes.iter())
            .filter_map(|class| self.rules.get(class))
            .flat_map(|specs| specs.iter())
            .filter(|spec| spec.applies_to(property_name))
            .last();
        let (mut duration, delay) = rule
            .map(|spec| (spec.duration_ms, spec.delay_ms))
            .unwrap_or((0.0, 0.0));
        if let Some(inline) = el.inline_duration_ms {
            duration = inline;
        }
        (duration.max(0.0), delay.max(0.0))
    }

    fn flush_styles(&mut self) {
        if self.style_dirty.is_empty() {
            return;
        }
        let mut dirty: Vec<NodeId> = self.style_dirty.drain().collect();
        dirty.sort();

        for node in dirty {
            let (duration_ms, delay_ms) = self.effective_transition(node, TRANSFORM);
            let Some(el) = self.elements.get_mut(&node) else {
                continue;
            };
            let target = el.inline_transform.unwrap_or_default();

            let running = el
                .transform_transition
                .as_ref()
                .map(|run| (run.to, run.current()));
            match running {
                // Cancelled: jumps to the end value, no `transitionend`.
                Some(_) if duration_ms <= 0.0 => el.transform_transition = None,
                Some((to, _)) if to == target => {}
                Some((_, from)) => {
                    el.transform_transition =
                        Some(TransformTransition::new(from, target, delay_ms, duration_ms));
                }
                None if el.computed_transform != target && duration_ms > 0.0 => {
                    el.transform_transition = Some(TransformTransition::new(
                        el.computed_transform,
                        target,
                        delay_ms,
                        duration_ms,
                    ));
                }
                None => {}
            }
            el.computed_transform = target;
        }
    }

    fn absolute_rect(&self, node: NodeId, with_transforms: bool) -> Option<Rect> {
        let own = self.taffy.layout(self.elements.get(&node)?.layout).ok()?;
        let (mut x, mut y) = (0.0, 0.0);
        let mut current = Some(node);
        while let Some(id) = current {
            let el = self.elements.get(&id)?;
            let layout = self.taffy.layout(el.layout).ok()?;
            x += layout.location.x;
            y += layout.location.y;
            if with_transforms {
                let (tx, ty) = el.visual_transform().translation();
                x += tx;
                y += ty;
            }
            current = el.parent;
        }
        Some(Rect::new(x, y, own.size.width, own.size.height))
    }

    fn mark_style_dirty(&mut self, node: NodeId) {
        if self.elements.contains_key(&node) {
            self.style_dirty.insert(node);
        }
    }
}

impl VisualTree for SceneTree {
    type Element = NodeId;

    fn create_element(&mut self, tag: &str) -> Option<NodeId> {
        match self.create(tag) {
            Ok(node) => Some(node),
            Err(err) => {
                warn!(error = %err, tag, "failed to create element");
                None
            }
        }
    }

    fn tracked_elements(&self, container: NodeId) -> Vec<(NodeId, ItemKey)> {
        let mut tracked = Vec::new();
        let mut stack: Vec<NodeId> = self.children(container).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let Some(el) = self.elements.get(&node) else {
                continue;
            };
            if let Some(key) = &el.marker {
                tracked.push((node, key.clone()));
            }
            stack.extend(el.children.iter().rev().copied());
        }
        tracked
    }

    fn bounding_rect(&mut self, element: NodeId) -> Option<Rect> {
        self.flush();
        if !self.is_connected(element) {
            return None;
        }
        self.absolute_rect(element, true)
    }

    fn reflow(&mut self) {
        self.ops.push(TreeOp::Reflow);
        self.flush();
    }

    fn add_class(&mut self, element: NodeId, class: &str) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        el.classes.get_or_insert_with(ClassList::new).add(class);
        self.ops.push(TreeOp::AddClass {
            node: element,
            class: class.to_string(),
        });
        self.mark_style_dirty(element);
    }

    fn remove_class(&mut self, element: NodeId, class: &str) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        if let Some(classes) = el.classes.as_mut() {
            classes.remove(class);
        }
        self.ops.push(TreeOp::RemoveClass {
            node: element,
            class: class.to_string(),
        });
        self.mark_style_dirty(element);
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.elements
            .get(&element)
            .and_then(|el| el.classes.as_ref())
            .is_some_and(|classes| classes.contains(class))
    }

    fn class_count(&self, element: NodeId) -> usize {
        self.elements
            .get(&element)
            .and_then(|el| el.classes.as_ref())
            .map_or(0, ClassList::len)
    }

    fn clear_class_attribute(&mut self, element: NodeId) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.classes = None;
            self.mark_style_dirty(element);
        }
    }

    fn set_transform(&mut self, element: NodeId, transform: Option<Transform2D>) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        el.inline_transform = transform;
        self.ops.push(TreeOp::SetTransform {
            node: element,
            transform,
        });
        self.mark_style_dirty(element);
    }

    fn set_transition_duration(&mut self, element: NodeId, duration_ms: Option<f32>) {
        let Some(el) = self.elements.get_mut(&element) else {
            return;
        };
        el.inline_duration_ms = duration_ms;
        self.ops.push(TreeOp::SetTransitionDuration {
            node: element,
            duration_ms,
        });
        self.mark_style_dirty(element);
    }

    fn is_connected(&self, element: NodeId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.elements.get(&id).and_then(|el| el.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TransitionProperty;

    fn column_scene() -> (SceneTree, NodeId) {
        let mut scene = SceneTree::new(400.0, 600.0).unwrap();
        let list = scene.create("ul").unwrap();
        scene.append_child(scene.root(), list).unwrap();
        scene.set_stack(list, StackDirection::Column, 10.0, 0.0).unwrap();
        (scene, list)
    }

    #[test]
    fn test_commit_children_lays_out_in_order() {
        let (mut scene, list) = column_scene();
        let specs = vec![
            ChildSpec::new("a", 100.0, 40.0),
            ChildSpec::new("b", 100.0, 40.0),
            ChildSpec::new("c", 100.0, 40.0),
        ];
        let nodes = scene.commit_children(list, &specs).unwrap();

        let ys: Vec<f32> = nodes
            .iter()
            .map(|n| scene.layout_rect(*n).unwrap().y)
            .collect();
        assert_eq!(ys, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn test_commit_children_reuses_elements_by_key() {
        let (mut scene, list) = column_scene();
        let first = scene
            .commit_children(
                list,
                &[ChildSpec::new("a", 10.0, 10.0), ChildSpec::new("b", 10.0, 10.0)],
            )
            .unwrap();
        let second = scene
            .commit_children(
                list,
                &[ChildSpec::new("b", 10.0, 10.0), ChildSpec::new("c", 10.0, 10.0)],
            )
            .unwrap();

        assert_eq!(second[0], first[1]);
        assert!(!scene.is_connected(first[0]));
        assert_eq!(scene.element_for_key(list, &ItemKey::from("a")), None);
        assert_eq!(scene.children(list), second.as_slice());
    }

    #[test]
    fn test_untracked_children_are_not_reported() {
        let (mut scene, list) = column_scene();
        scene
            .commit_children(
                list,
                &[
                    ChildSpec::new("a", 10.0, 10.0),
                    ChildSpec::new("spacer", 10.0, 10.0).untracked(),
                ],
            )
            .unwrap();

        let keys: Vec<ItemKey> = scene
            .tracked_elements(list)
            .into_iter()
            .map(|(_, key)| key)
            .collect();
        assert_eq!(keys, vec![ItemKey::from("a")]);
    }

    #[test]
    fn test_append_rejects_cycle() {
        let (mut scene, list) = column_scene();
        let inner = scene.create("li").unwrap();
        scene.append_child(list, inner).unwrap();
        assert_eq!(
            scene.append_child(inner, list),
            Err(TreeError::Cycle {
                parent: inner,
                child: list
            })
        );
        assert_eq!(scene.remove_element(scene.root()), Err(TreeError::RootRemoval));
    }

    #[test]
    fn test_style_writes_apply_at_flush() {
        let (mut scene, list) = column_scene();
        let nodes = scene
            .commit_children(list, &[ChildSpec::new("a", 10.0, 10.0)])
            .unwrap();
        let node = nodes[0];
        scene.add_transition_rule("slide", TransitionSpec::property(TransitionProperty::Transform, 100.0));
        scene.add_class(node, "slide");

        // Two writes before a flush: only the last value is transitioned to.
        scene.set_transform(node, Some(Transform2D::translate(0.0, 50.0)));
        scene.set_transform(node, None);
        scene.reflow();
        assert!(!scene.is_transitioning(node));

        scene.set_transform(node, Some(Transform2D::translate(0.0, 50.0)));
        scene.reflow();
        assert!(scene.is_transitioning(node));

        let deliveries = scene.advance(100.0);
        assert_eq!(deliveries.first().map(|(n, _)| *n), Some(node));
        assert!(deliveries.iter().any(|(n, _)| *n == scene.root()));
        assert_eq!(
            scene.visual_transform(node),
            Some(Transform2D::translate(0.0, 50.0))
        );
    }

    #[test]
    fn test_bounding_rect_includes_visual_transform() {
        let (mut scene, list) = column_scene();
        let node = scene
            .commit_children(list, &[ChildSpec::new("a", 10.0, 10.0)])
            .unwrap()[0];
        scene.set_transform(node, Some(Transform2D::translate(5.0, -20.0)));
        let rect = scene.bounding_rect(node).unwrap();
        assert_eq!((rect.x, rect.y), (5.0, -20.0));
        assert_eq!(scene.layout_rect(node).unwrap().y, 0.0);
    }

    #[test]
    fn test_zero_duration_cancels_running_transition() {
        let (mut scene, list) = column_scene();
        let node = scene
            .commit_children(list, &[ChildSpec::new("a", 10.0, 10.0)])
            .unwrap()[0];
        scene.add_transition_rule("slide", TransitionSpec::all(200.0));
        scene.add_class(node, "slide");
        scene.set_transform(node, Some(Transform2D::translate(30.0, 0.0)));
        scene.reflow();
        assert!(scene.is_transitioning(node));

        scene.set_transition_duration(node, Some(0.0));
        scene.reflow();
        assert!(!scene.is_transitioning(node));
        assert_eq!(
            scene.visual_transform(node),
            Some(Transform2D::translate(30.0, 0.0))
        );
        assert!(scene.advance(500.0).is_empty());
    }

    #[test]
    fn test_removed_element_drops_transitions_silently() {
        let (mut scene, list) = column_scene();
        let node = scene
            .commit_children(list, &[ChildSpec::new("a", 10.0, 10.0)])
            .unwrap()[0];
        assert!(scene.start_property_transition(node, "opacity", 100.0));
        scene.remove_element(node).unwrap();
        assert!(scene.advance(200.0).is_empty());
        assert!(scene.bounding_rect(node).is_none());
    }

    #[test]
    fn test_op_log_records_writes() {
        let (mut scene, list) = column_scene();
        scene.clear_op_log();
        scene.add_class(list, "r-move");
        scene.reflow();
        assert_eq!(
            scene.op_log(),
            &[
                TreeOp::AddClass {
                    node: list,
                    class: "r-move".into()
                },
                TreeOp::Reflow
            ]
        );
        assert_eq!(scene.class_attribute(list).as_deref(), Some("r-move"));
    }
}
