//! Error types for the in-memory scene tree.

use thiserror::Error;

use crate::scene::NodeId;

/// Result type for scene tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised by [`SceneTree`](crate::scene::SceneTree) structure edits.
///
/// The animator never sees these; its view of the tree goes through
/// [`VisualTree`](crate::tree::VisualTree), which degrades silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// No element with this id exists (or it was removed).
    #[error("unknown element: {0:?}")]
    UnknownElement(NodeId),

    /// Appending would make an element its own ancestor.
    #[error("cannot append {child:?} under its descendant {parent:?}")]
    Cycle { parent: NodeId, child: NodeId },

    /// The root element cannot be removed.
    #[error("cannot remove the root element")]
    RootRemoval,

    /// Layout engine failure.
    #[error("layout failed: {0}")]
    Layout(String),
}
