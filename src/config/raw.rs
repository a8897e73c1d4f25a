//! Embedded page configuration
//!
//! The page ships a JSON object inside an inline script element. Nothing in it
//! is trusted: values are only ever used through the resolver's predicates.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::dom::Dom;

/// Untrusted key/value payload decoded once per page load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawConfig {
    values: BTreeMap<String, String>,
}

impl RawConfig {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict decode: the payload must be a JSON object
    ///
    /// Non-string members are dropped; blank text decodes to an empty config.
    pub fn try_decode(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let value: Value = serde_json::from_str(text).context("Config payload is not valid JSON")?;
        let Value::Object(members) = value else {
            bail!("Config payload is not a JSON object");
        };

        let mut values = BTreeMap::new();
        for (key, member) in members {
            match member {
                Value::String(s) => {
                    values.insert(key, s);
                }
                other => debug!(key = %key, kind = %json_kind(&other), "Ignoring non-string config value"),
            }
        }
        Ok(Self { values })
    }

    /// Decode, substituting an empty config for anything malformed
    pub fn decode(text: &str) -> Self {
        Self::try_decode(text).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Config payload rejected, using empty config");
            Self::empty()
        })
    }

    /// Read and decode the payload embedded in the element with `element_id`
    pub fn from_document(dom: &impl Dom, element_id: &str) -> Self {
        match dom.element_by_id(element_id) {
            Some(node) => Self::decode(&dom.text(node)),
            None => {
                debug!(element_id = %element_id, "No embedded config element");
                Self::empty()
            }
        }
    }

    /// Raw value for `key`, if present (may be empty)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Raw value for `key` only when it has non-blank content
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryDocument, PageFixture};

    #[test]
    fn test_decode_object_keeps_strings() {
        let config = RawConfig::decode(r#"{"x": "@club", "line": "", "members": 12, "tags": ["a"]}"#);
        assert_eq!(config.get("x"), Some("@club"));
        assert_eq!(config.get("line"), Some(""));
        assert_eq!(config.non_empty("line"), None);
        assert_eq!(config.get("members"), None);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_decode_malformed_is_empty() {
        for payload in [
            "{",
            "{\"x\": \"@club\",",
            "not json",
            "[1, 2, 3]",
            "\"just a string\"",
            "null",
            "42",
        ] {
            assert!(RawConfig::try_decode(payload).is_err(), "payload {payload:?}");
            assert_eq!(RawConfig::decode(payload), RawConfig::empty(), "payload {payload:?}");
        }
    }

    #[test]
    fn test_decode_blank_is_empty_without_error() {
        assert!(RawConfig::try_decode("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_from_document_reads_script_text() {
        let doc = MemoryDocument::from_fixture(PageFixture {
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_y: 0.0,
            elements: vec![ElementSpec::new("script")
                .id("club-config")
                .attr("type", "application/json")
                .text(r#"{"email": "info@example.com"}"#)],
        });
        let config = RawConfig::from_document(&doc, "club-config");
        assert_eq!(config.get("email"), Some("info@example.com"));

        let missing = RawConfig::from_document(&doc, "other-config");
        assert!(missing.is_empty());
    }
}
