//! Item identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a list item, assigned by the caller.
///
/// Keys must be unique among items that coexist in one list. A string key and
/// a numeric key never compare equal, even if they render the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemKey {
    Num(i64),
    Str(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ItemKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for ItemKey {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<i64> for ItemKey {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for ItemKey {
    fn from(n: i32) -> Self {
        Self::Num(i64::from(n))
    }
}

impl From<u32> for ItemKey {
    fn from(n: u32) -> Self {
        Self::Num(i64::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ItemKey::from("card-1").to_string(), "card-1");
        assert_eq!(ItemKey::from(42).to_string(), "42");
    }

    #[test]
    fn test_string_and_number_keys_differ() {
        assert_ne!(ItemKey::from("7"), ItemKey::from(7));
    }

    #[test]
    fn test_untagged_serialization() {
        let keys = vec![ItemKey::from("a"), ItemKey::from(3)];
        let json = serde_json::to_string(&keys).unwrap();
        assert_eq!(json, r#"["a",3]"#);

        let parsed: Vec<ItemKey> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, keys);
    }

    #[test]
    fn test_numeric_keys_convert_losslessly() {
        assert_eq!(ItemKey::from(u32::MAX), ItemKey::Num(4_294_967_295));
        assert_eq!(ItemKey::from(i32::MIN), ItemKey::Num(-2_147_483_648));
    }
}
