use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Longest string value kept when metadata filtering is on.
pub const MAX_FILTERED_VALUE_LEN: usize = 8192;

/// A single original-metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetadataValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(v) => write!(f, "{v}"),
            MetadataValue::Int(v) => write!(f, "{v}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<usize> for MetadataValue {
    fn from(v: usize) -> Self {
        MetadataValue::Int(v as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

/// Original metadata parsed from a file, keyed by field name.
pub type MetadataTable = HashMap<String, MetadataValue>;

/// Clean-up applied to original metadata while a file is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub enabled: bool,
}

impl MetadataFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Return the value to store for `key`, or `None` to drop it.
    ///
    /// When disabled every value is kept as is. When enabled, keys and text
    /// values are trimmed, and empty values or values with control characters
    /// or more than [`MAX_FILTERED_VALUE_LEN`] bytes are dropped.
    pub fn apply(&self, key: &str, value: MetadataValue) -> Option<(String, MetadataValue)> {
        if !self.enabled {
            return Some((key.to_string(), value));
        }

        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        match value {
            MetadataValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                if text.len() > MAX_FILTERED_VALUE_LEN {
                    warn!(key, len = text.len(), "dropping oversized metadata value");
                    return None;
                }
                if text.chars().any(|c| c.is_control() && c != '\t') {
                    warn!(key, "dropping metadata value with control characters");
                    return None;
                }
                Some((key.to_string(), MetadataValue::Text(text.to_string())))
            }
            other => Some((key.to_string(), other)),
        }
    }
}
