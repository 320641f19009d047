//! Style-sheet transition rules.
//!
//! A [`TransitionSpec`] is what a host style sheet attaches to a class, e.g.
//! the `{name}-move` rule that makes released items glide to their new spot.
//!
//! ```ignore
//! use flips_core::transition::{TransitionProperty, TransitionSpec};
//!
//! // .r-move { transition: transform 300ms }
//! let spec = TransitionSpec::property(TransitionProperty::Transform, 300.0);
//! ```

use serde::{Deserialize, Serialize};

/// The property a transition rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionProperty {
    /// Every property (CSS `transition: all`).
    All,
    Transform,
    Opacity,
    /// Any other property, by CSS name.
    Named { name: String },
}

impl TransitionProperty {
    /// CSS property name as reported in `transitionend` events.
    pub fn css_name(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Transform => "transform",
            Self::Opacity => "opacity",
            Self::Named { name } => name,
        }
    }

    pub fn covers(&self, property_name: &str) -> bool {
        match self {
            Self::All => true,
            other => other.css_name() == property_name,
        }
    }
}

impl Default for TransitionProperty {
    fn default() -> Self {
        Self::All
    }
}

/// One transition declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub property: TransitionProperty,
    /// Duration of the transition in milliseconds.
    pub duration_ms: f32,
    /// Delay before the transition starts in milliseconds.
    #[serde(default)]
    pub delay_ms: f32,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            property: TransitionProperty::All,
            duration_ms: 300.0,
            delay_ms: 0.0,
        }
    }
}

impl TransitionSpec {
    pub fn property(property: TransitionProperty, duration_ms: f32) -> Self {
        Self {
            property,
            duration_ms,
            delay_ms: 0.0,
        }
    }

    pub fn all(duration_ms: f32) -> Self {
        Self::property(TransitionProperty::All, duration_ms)
    }

    pub fn applies_to(&self, property_name: &str) -> bool {
        self.property.covers(property_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_spec_defaults() {
        let spec = TransitionSpec::default();
        assert_eq!(spec.property, TransitionProperty::All);
        assert_eq!(spec.duration_ms, 300.0);
        assert_eq!(spec.delay_ms, 0.0);
    }

    #[test]
    fn test_applies_to() {
        let all = TransitionSpec::all(300.0);
        assert!(all.applies_to("transform"));
        assert!(all.applies_to("opacity"));

        let transform = TransitionSpec::property(TransitionProperty::Transform, 300.0);
        assert!(transform.applies_to("transform"));
        assert!(!transform.applies_to("opacity"));

        let named = TransitionSpec::property(
            TransitionProperty::Named {
                name: "height".into(),
            },
            100.0,
        );
        assert!(named.applies_to("height"));
    }

    #[test]
    fn test_spec_serialization() {
        let spec = TransitionSpec::property(TransitionProperty::Transform, 250.0);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("transform"));

        let parsed: TransitionSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spec);
    }
}
