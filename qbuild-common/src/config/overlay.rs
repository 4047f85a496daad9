//! Per-developer `.env` overlay.
//!
//! The overlay is a file of `KEY=VALUE` lines kept out of source control.
//! Any string in the shared project configuration that is exactly equal to
//! an overlay key is replaced by the key's value, so a checked-in
//! configuration can say `"buildLibrary": "BUILDLIB"` and each developer
//! maps `BUILDLIB` to their own library.

use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Parsed overlay mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    values: HashMap<String, String>,
}

impl Overlay {
    /// Read an overlay file. A missing file is an empty overlay.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Parse overlay content.
    ///
    /// Lines starting with `#` and lines without `=` are ignored. The line is
    /// split at the first `=`; key and value are trimmed.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return a copy of `value` with every matching string scalar replaced.
    pub fn apply(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => match self.values.get(s) {
                Some(replacement) => Value::String(replacement.clone()),
                None => value.clone(),
            },
            Value::Array(items) => Value::Array(items.iter().map(|v| self.apply(v)).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.apply(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
