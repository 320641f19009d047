//! FLIP move animation.
//!
//! One cycle per commit, always in this order:
//!
//! ```text
//! capture (before commit)   prior[key] = relative rect
//! -- host commits --
//! measure (after commit)    drop move class, next[key] = relative rect,
//!                           seed prior[key] = next[key] for new keys
//! invert                    translate(dx, dy), transition-duration 0
//! reflow barrier            once for the whole batch
//! release                   add move class, clear inline overrides,
//!                           arm a one-shot transitionend listener
//! ```
//!
//! The listener fires only for a `transform` transition whose target is the
//! listening element itself, then removes the move class.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::events::TransitionEnd;
use crate::key::ItemKey;
use crate::rect::{RectSnapshot, RelativeRect};
use crate::transform::Transform2D;
use crate::tree::{VisualTree, add_class, relative_rect, remove_class};

/// Where a tracked item is in its move animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    /// Not moving.
    #[default]
    Idle,
    /// Drawn at its old position with transitions disabled.
    Inverted,
    /// Inline overrides cleared, move class applied.
    Released,
    /// Gliding to its new position; waiting for `transitionend`.
    AwaitingTransitionEnd,
}

/// Displacement played for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub key: ItemKey,
    pub dx: f32,
    pub dy: f32,
}

/// Summary of one post-commit pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlipReport {
    /// Tracked items measured after the commit.
    pub measured: usize,
    /// Items seen for the first time; they never move on this cycle.
    pub seeded: usize,
    /// Items that were inverted and released, in document order.
    pub moved: Vec<MoveRecord>,
}

impl FlipReport {
    pub fn moved_keys(&self) -> Vec<&ItemKey> {
        self.moved.iter().map(|m| &m.key).collect()
    }

    pub fn delta_for(&self, key: &ItemKey) -> Option<(f32, f32)> {
        self.moved
            .iter()
            .find(|m| &m.key == key)
            .map(|m| (m.dx, m.dy))
    }
}

#[derive(Debug, Clone)]
struct MoveListener {
    key: ItemKey,
    move_class: String,
}

/// Measures tracked items around each commit and plays their moves.
#[derive(Debug)]
pub struct FlipAnimator<E> {
    move_class: String,
    /// Positions just before the last commit. `None` until the first capture.
    prior: Option<RectSnapshot>,
    /// One-shot listeners per element. Stacked when an element moves again
    /// before its previous move finished.
    listeners: HashMap<E, Vec<MoveListener>>,
    states: HashMap<ItemKey, MoveState>,
    cycle: u64,
}

impl<E> FlipAnimator<E>
where
    E: Copy + Eq + Hash + Debug,
{
    pub fn new(move_class: impl Into<String>) -> Self {
        Self {
            move_class: move_class.into(),
            prior: None,
            listeners: HashMap::new(),
            states: HashMap::new(),
            cycle: 0,
        }
    }

    pub fn move_class(&self) -> &str {
        &self.move_class
    }

    pub fn prior(&self) -> Option<&RectSnapshot> {
        self.prior.as_ref()
    }

    pub fn move_state(&self, key: &ItemKey) -> MoveState {
        self.states.get(key).copied().unwrap_or_default()
    }

    /// Number of armed, not yet fired listeners.
    pub fn pending_listeners(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Items with a move in flight.
    pub fn moving(&self) -> usize {
        self.states.len()
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Pre-commit capture. Replaces the prior snapshot with the current
    /// position of every tracked item under `container`.
    pub fn capture<T>(&mut self, tree: &mut T, container: E) -> usize
    where
        T: VisualTree<Element = E> + ?Sized,
    {
        self.prune(&*tree);

        let mut snapshot = RectSnapshot::new();
        for (element, key) in tree.tracked_elements(container) {
            if let Some(rect) = relative_rect(tree, container, element) {
                snapshot.insert(key, rect);
            }
        }

        let captured = snapshot.len();
        trace!(captured, "captured prior rects");
        self.prior = Some(snapshot);
        captured
    }

    /// Post-commit pass: measure, invert, barrier, release.
    ///
    /// Does nothing before the first [`capture`](Self::capture).
    pub fn play<T>(&mut self, tree: &mut T, container: E) -> FlipReport
    where
        T: VisualTree<Element = E> + ?Sized,
    {
        let mut report = FlipReport::default();
        let Some(prior) = self.prior.as_mut() else {
            debug!("no prior snapshot; skipping move pass");
            return report;
        };
        self.cycle += 1;

        let mut measured: Vec<(E, ItemKey, RelativeRect)> = Vec::new();
        for (element, key) in tree.tracked_elements(container) {
            remove_class(tree, element, &self.move_class);
            let Some(rect) = relative_rect(tree, container, element) else {
                continue;
            };
            if prior.seed(&key, rect) {
                report.seeded += 1;
            }
            measured.push((element, key, rect));
        }
        report.measured = measured.len();

        // Only keys still on screen keep a state.
        let present: HashSet<&ItemKey> = measured.iter().map(|(_, key, _)| key).collect();
        self.states.retain(|key, _| present.contains(key));

        let mut inverted = Vec::new();
        for (element, key, next) in measured {
            let Some(before) = prior.get(&key) else {
                continue;
            };
            let (dx, dy) = next.delta_from(before);
            if dx == 0.0 && dy == 0.0 {
                continue;
            }

            let inverse = Transform2D::translate(dx, dy);
            tree.set_transform(element, Some(inverse));
            tree.set_transition_duration(element, Some(0.0));
            trace!(key = %key, transform = %inverse, "inverted");
            self.states.insert(key.clone(), MoveState::Inverted);
            report.moved.push(MoveRecord {
                key: key.clone(),
                dx,
                dy,
            });
            inverted.push((element, key));
        }

        // Paint every inverted item before any of them is released.
        tree.reflow();

        for (element, key) in inverted {
            add_class(tree, element, &self.move_class);
            tree.set_transform(element, None);
            tree.set_transition_duration(element, None);
            self.states.insert(key.clone(), MoveState::Released);

            self.listeners.entry(element).or_default().push(MoveListener {
                key: key.clone(),
                move_class: self.move_class.clone(),
            });
            self.states.insert(key, MoveState::AwaitingTransitionEnd);
        }

        debug!(
            cycle = self.cycle,
            measured = report.measured,
            seeded = report.seeded,
            moved = report.moved.len(),
            "move pass complete"
        );
        report
    }

    /// Deliver a `transitionend` that reached `current_target`.
    ///
    /// Returns true if it completed a move. Events from descendants or for
    /// other properties are ignored and leave the listeners armed.
    pub fn handle_transition_end<T>(
        &mut self,
        tree: &mut T,
        current_target: E,
        event: &TransitionEnd<E>,
    ) -> bool
    where
        T: VisualTree<Element = E> + ?Sized,
    {
        if event.target != current_target || !event.is_transform() {
            return false;
        }
        let Some(listeners) = self.listeners.remove(&current_target) else {
            return false;
        };

        for listener in listeners {
            remove_class(tree, current_target, &listener.move_class);
            trace!(key = %listener.key, "move finished");
            self.states.remove(&listener.key);
        }
        true
    }

    /// Drop listeners of elements the host has destroyed.
    fn prune<T>(&mut self, tree: &T)
    where
        T: VisualTree<Element = E> + ?Sized,
    {
        let states = &mut self.states;
        self.listeners.retain(|element, listeners| {
            if tree.is_connected(*element) {
                return true;
            }
            for listener in listeners.iter() {
                states.remove(&listener.key);
            }
            false
        });
    }
}
