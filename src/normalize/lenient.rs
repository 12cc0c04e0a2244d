//! Field decoders for the server's loosely typed leaves.
//!
//! Prism marks many fields as "any" and is inconsistent about them. A leaf
//! that is absent, `null` or of an unexpected type decodes to its zero value
//! instead of failing the entity. Combine with `#[serde(default)]` so absent
//! keys are covered too.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Decode `T`, or fall back to `T::default()` on any shape mismatch
pub(crate) fn value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// Decode a string, treating `""` like an absent value
pub(crate) fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Decode a list of strings, dropping elements that are not strings
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Decode a telemetry block into string values.
///
/// Quoted numbers are kept verbatim (`"0001"` stays `"0001"`). Bare JSON
/// numbers and booleans keep their textual rendering; `null` and nested
/// values are dropped.
pub(crate) fn telemetry<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Object(map) = raw else {
        return Ok(BTreeMap::new());
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

/// A field the server sends either as a single value or as a list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<Value>),
}

impl OneOrMany {
    /// Collapse into a set of non-empty strings
    pub(crate) fn into_set(self) -> BTreeSet<String> {
        match self {
            OneOrMany::One(s) => std::iter::once(s).filter(|s| !s.is_empty()).collect(),
            OneOrMany::Many(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.is_empty() => Some(s),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Short description of a JSON value's type, for diagnostics
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
