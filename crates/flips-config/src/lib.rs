//! Flips configuration
//!
//! Options recognized by the list transition controller, loaded from
//! `flips.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default class-name prefix.
pub const DEFAULT_NAME: &str = "r";

/// Default enter/leave duration hint in milliseconds.
pub const DEFAULT_IN_OUT_DURATION: f64 = 200.0;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid TOML for [`FlipsConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for a keyed, animated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipsConfig {
    /// Tag of the container element wrapping the items.
    pub wrap: String,
    /// Class applied to the container element.
    pub wrap_class: String,
    /// Class-name prefix; the move class is `{name}-move`.
    pub name: String,
    /// Enter/leave timing hint (ms) handed to every item. Not used by the
    /// move animation itself.
    pub in_out_duration: f64,
}

impl Default for FlipsConfig {
    fn default() -> Self {
        Self {
            wrap: "div".to_string(),
            wrap_class: String::new(),
            name: DEFAULT_NAME.to_string(),
            in_out_duration: DEFAULT_IN_OUT_DURATION,
        }
    }
}

impl FlipsConfig {
    /// Effective class-name prefix. Blank names fall back to [`DEFAULT_NAME`].
    pub fn prefix(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { DEFAULT_NAME } else { trimmed }
    }

    /// Class toggled on items while they play a move transition.
    pub fn move_class(&self) -> String {
        format!("{}-move", self.prefix())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_in_out_duration(mut self, duration_ms: f64) -> Self {
        self.in_out_duration = duration_ms;
        self
    }

    pub fn with_wrap(mut self, tag: impl Into<String>) -> Self {
        self.wrap = tag.into();
        self
    }

    pub fn with_wrap_class(mut self, class: impl Into<String>) -> Self {
        self.wrap_class = class.into();
        self
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `flips.toml` from the current directory, or the defaults if it
    /// is missing or invalid.
    pub fn load_or_default() -> Self {
        Self::load_from_file("flips.toml").unwrap_or_default()
    }

    /// Apply environment overrides. Environment values take precedence over
    /// the file; unparsable numbers are ignored.
    pub fn merge_with_env(&mut self) {
        if let Ok(wrap) = std::env::var("FLIPS_WRAP") {
            self.wrap = wrap;
        }
        if let Ok(class) = std::env::var("FLIPS_WRAP_CLASS") {
            self.wrap_class = class;
        }
        if let Ok(name) = std::env::var("FLIPS_NAME") {
            self.name = name;
        }
        if let Ok(val) = std::env::var("FLIPS_IN_OUT_DURATION") {
            if let Ok(duration) = val.trim().parse::<f64>() {
                self.in_out_duration = duration;
            }
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// 1. Load from flips.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = FlipsConfig::default();
        assert_eq!(config.wrap, "div");
        assert_eq!(config.wrap_class, "");
        assert_eq!(config.name, "r");
        assert_eq!(config.in_out_duration, 200.0);
        assert_eq!(config.move_class(), "r-move");
    }

    #[test]
    fn test_blank_name_falls_back_to_default_prefix() {
        let config = FlipsConfig::default().with_name("   ");
        assert_eq!(config.move_class(), "r-move");

        let config = FlipsConfig::default().with_name(" list ");
        assert_eq!(config.move_class(), "list-move");
    }

    #[test]
    fn test_toml_serialization() {
        let config = FlipsConfig::default().with_name("cards").with_wrap("ul");
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: FlipsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"todo\"").unwrap();
        writeln!(file, "in_out_duration = 350.0").unwrap();

        let config = FlipsConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.name, "todo");
        assert_eq!(config.in_out_duration, 350.0);
        assert_eq!(config.wrap, "div");
        assert_eq!(config.wrap_class, "");
    }

    #[test]
    fn test_load_errors() {
        let missing = FlipsConfig::load_from_file("/definitely/not/here/flips.toml");
        assert!(matches!(missing, Err(ConfigError::Read(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "in_out_duration = \"slow\"").unwrap();
        let bad = FlipsConfig::load_from_file(file.path());
        assert!(matches!(bad, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if flips.toml doesn't exist
        let config = FlipsConfig::load_or_default();
        assert!(!config.move_class().is_empty());
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("FLIPS_NAME", "grid");
            std::env::set_var("FLIPS_WRAP_CLASS", "board");
            std::env::set_var("FLIPS_IN_OUT_DURATION", "not-a-number");
        }

        let mut config = FlipsConfig::default();
        config.merge_with_env();

        assert_eq!(config.name, "grid");
        assert_eq!(config.wrap_class, "board");
        assert_eq!(config.in_out_duration, 200.0);

        unsafe {
            std::env::remove_var("FLIPS_NAME");
            std::env::remove_var("FLIPS_WRAP_CLASS");
            std::env::remove_var("FLIPS_IN_OUT_DURATION");
        }
    }
}
