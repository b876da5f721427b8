// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/mod.rs
pub mod yaml;

pub use yaml::{read_yaml, read_yaml_str, yaml_to_json};

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Label used in errors for configs that were not read from a file.
pub(crate) const IN_MEMORY: &str = "<memory>";

static NULL: Value = Value::Null;

/// A parsed YAML or JSON document whose top level is a mapping.
///
/// Values keep the key order of the source document. Nested values are
/// reached with [`Config::get_path`] (`"training.params.epochs"`, numeric
/// segments index into sequences) or by deserializing into a typed struct
/// with [`Config::deserialize`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    inner: Map<String, Value>,
    source: Option<PathBuf>,
}

impl Config {
    /// Wrap a JSON value. Anything other than an object is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(inner) => Ok(Self { inner, source: None }),
            other => Err(Error::NotAMapping {
                found: value_kind(&other),
            }),
        }
    }

    /// Record the file this config was read from.
    pub fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// File this config was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Look up a dot-separated path. A top-level key that itself contains
    /// dots wins over the nested interpretation.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(v) = self.inner.get(path) {
            return Some(v);
        }
        let mut segments = path.split('.');
        let mut current = self.inner.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn require(&self, path: &str) -> Result<&Value> {
        self.get_path(path).ok_or_else(|| Error::MissingKey {
            path: path.to_string(),
        })
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get_path(path).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get_path(path).and_then(Value::as_u64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get_path(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get_path(path).and_then(Value::as_bool)
    }

    /// Nested mapping at `path` as its own `Config`.
    pub fn section(&self, path: &str) -> Option<Config> {
        match self.get_path(path)? {
            Value::Object(map) => Some(Config {
                inner: map.clone(),
                source: self.source.clone(),
            }),
            _ => None,
        }
    }

    /// Deserialize the whole document into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_value()).map_err(|e| self.shape_error(e))
    }

    /// Deserialize the value at `path` into a typed struct.
    pub fn deserialize_path<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.require(path)?.clone();
        serde_json::from_value(value).map_err(|e| self.shape_error(e))
    }

    fn shape_error(&self, e: serde_json::Error) -> Error {
        let origin = self.source.as_deref().unwrap_or(Path::new(IN_MEMORY));
        Error::parse(origin, "config", e)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.inner
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.inner.clone())
    }
}

/// Two configs are equal when their contents are; where they came from
/// does not matter.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl PartialEq<Map<String, Value>> for Config {
    fn eq(&self, other: &Map<String, Value>) -> bool {
        &self.inner == other
    }
}

impl Index<&str> for Config {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.inner.get(key).unwrap_or(&NULL)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl From<Map<String, Value>> for Config {
    fn from(inner: Map<String, Value>) -> Self {
        Self { inner, source: None }
    }
}

impl TryFrom<Value> for Config {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
