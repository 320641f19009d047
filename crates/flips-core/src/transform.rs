//! Inline `transform` overrides.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D translation, the only transform the move animation writes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform2D {
    pub tx: f32,
    pub ty: f32,
}

impl Transform2D {
    pub const EPSILON: f32 = 1e-4;

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self { tx, ty }
    }

    pub fn translation(&self) -> (f32, f32) {
        (self.tx, self.ty)
    }

    pub fn is_identity(&self) -> bool {
        self.tx.abs() < Self::EPSILON && self.ty.abs() < Self::EPSILON
    }

    /// Interpolate toward `to`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            tx: self.tx + (to.tx - self.tx) * t,
            ty: self.ty + (to.ty - self.ty) * t,
        }
    }
}

/// CSS `transform` value.
impl fmt::Display for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}px,{}px)", self.tx, self.ty)
    }
}
