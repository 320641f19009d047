//! Keyed list reconciliation and FLIP move animations.
//!
//! This crate provides:
//! - **Reconciliation**: ordered union of the previous and next keyed item sets,
//!   keeping removed items in place until their exit transition completes
//! - **Lifecycle annotation**: per-item metadata (enable flag, class prefix,
//!   enter/leave duration, exit completion handle)
//! - **FLIP animation**: measure before commit, measure after, invert the
//!   displacement, release it under the `{name}-move` transition
//! - **SceneTree**: an in-memory, taffy-laid-out host tree for tests and demos
//!
//! # Architecture
//!
//! ```text
//! Flips
//!   ├── ChildrenMap<ItemDescriptor<T>>   (merge + annotate each update)
//!   ├── ExitRegistry                     (current exit handle per key)
//!   └── FlipAnimator
//!         ├── RectSnapshot               (positions before the last commit)
//!         └── move listeners             (one-shot, per element)
//!
//! VisualTree (host seam)
//!   └── SceneTree                        (taffy layout, transition clock)
//! ```

pub mod animator;
pub mod children;
pub mod class_list;
pub mod error;
pub mod events;
pub mod flips;
pub mod key;
pub mod lifecycle;
pub mod rect;
pub mod reconcile;
pub mod scene;
pub mod transform;
pub mod transition;
pub mod tree;

pub use animator::{FlipAnimator, FlipReport, MoveRecord, MoveState};
pub use children::{ChildrenMap, Keyed};
pub use class_list::ClassList;
pub use error::{Result, TreeError};
pub use events::TransitionEnd;
pub use flips::Flips;
pub use key::ItemKey;
pub use lifecycle::{ExitHandle, ExitRegistry, ItemDescriptor, ItemMeta, annotate, initial};
pub use rect::{Rect, RectSnapshot, RelativeRect};
pub use reconcile::{Presence, classify, merge, merge_by};
pub use scene::{ChildSpec, NodeId, SceneTree, StackDirection, TreeOp};
pub use transform::Transform2D;
pub use transition::{TransitionProperty, TransitionSpec};
pub use tree::VisualTree;
