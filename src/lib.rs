//! Keyed list transitions with FLIP move animations.
//!
//! Re-exports the engine (`flips-core`) and its configuration (`flips-config`).

pub use flips_config::{ConfigError, FlipsConfig};
pub use flips_core::*;
