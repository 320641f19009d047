//! `transitionend` deliveries.
//!
//! A finished transition is delivered as a [`TransitionEnd`] that bubbles from
//! its target up through the ancestors, so listeners see events raised by
//! their descendants too and have to check the target themselves.

use serde::{Deserialize, Serialize};

/// Payload of a `transitionend` delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEnd<E> {
    /// Element whose transition finished.
    pub target: E,
    /// CSS name of the transitioned property.
    pub property_name: String,
    /// Running time of the transition, excluding delay.
    pub elapsed_ms: f32,
}

impl<E> TransitionEnd<E> {
    /// Whether the finished property is a transform (prefixed or not).
    pub fn is_transform(&self) -> bool {
        self.property_name.ends_with("transform")
    }
}
