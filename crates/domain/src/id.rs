//! Typed identifier newtypes backed by strings.
//!
//! Device identifiers come from the ingestion layer as-is (e.g.
//! `"device_001"`); rule identifiers are fixed slugs from the default
//! rule template (e.g. `"temp_danger_pause"`).

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Access the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a monitored production line (one scheduler state per device).
    DeviceId
);

define_id!(
    /// Identifier of a [`Rule`](crate::rule::Rule) within a device's rule set.
    RuleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compare_equal_when_built_from_same_text() {
        let a = DeviceId::from("device_001");
        let b = DeviceId::new("device_001".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = RuleId::from("temp_danger_pause");
        let text = id.to_string();
        let parsed: RuleId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let id = DeviceId::from("device_001");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"device_001\"");
        let parsed: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn should_report_empty_identifier() {
        assert!(DeviceId::from("").is_empty());
        assert!(!DeviceId::from("line-a").is_empty());
    }

    #[test]
    fn should_lookup_map_by_str_through_borrow() {
        let mut map = std::collections::HashMap::new();
        map.insert(RuleId::from("production_complete"), 1);
        assert_eq!(map.get("production_complete"), Some(&1));
    }
}
