//! Structured (JSON-shaped) form of the rule AST.
//!
//! Every AST type converts to and from a `serde_json::Value`. Decoding is
//! strict: unknown keys, missing required keys and wrong value types fail
//! with [`RuleError::Deserialization`] carrying the location of the problem
//! (`$.conditions.where[2].operator`). Node invariants are still enforced by
//! the AST constructors and surface as structural errors.
//!
//! Literals that JSON cannot carry natively use single-key tagged objects:
//! `{"date": "2024-01-31"}`, `{"timestamp": "2024-01-31T08:00:00"}`, and
//! `{"string": "u.id"}` for a function argument that would otherwise be read
//! as a column reference.

mod clauses;
mod conditions;
mod config;
mod values;

use serde_json::{Map, Value};

use crate::ast::RuleConfiguration;
use crate::error::{RuleError, RuleResult};

/// Path of the document root in error locations.
pub const ROOT: &str = "$";

/// Conversion between an AST node and its structured form.
pub trait Structured: Sized {
    fn to_structured(&self) -> Value;

    /// Decode a document rooted at `$`.
    fn from_structured(value: &Value) -> RuleResult<Self> {
        Self::decode(value, ROOT)
    }

    /// Decode `value`, reporting errors relative to `path`.
    fn decode(value: &Value, path: &str) -> RuleResult<Self>;
}

/// Parse a configuration from JSON text.
pub fn from_json(json: &str) -> RuleResult<RuleConfiguration> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| RuleError::deserialization(ROOT, e.to_string()))?;
    RuleConfiguration::from_structured(&value)
}

/// Pretty-printed JSON for a configuration.
pub fn to_json(config: &RuleConfiguration) -> String {
    // Serializing a Value cannot fail
    serde_json::to_string_pretty(&config.to_structured()).unwrap_or_default()
}

pub(crate) fn key_path(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn decode_list<T: Structured>(items: &[Value], path: &str) -> RuleResult<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| T::decode(item, &index_path(path, i)))
        .collect()
}

pub(crate) fn string_list(items: &[Value], path: &str) -> RuleResult<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                RuleError::deserialization(
                    index_path(path, i),
                    format!("expected a string, got {}", type_name(item)),
                )
            })
        })
        .collect()
}

/// A JSON object with a fixed set of allowed keys.
pub(crate) struct Object<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Object<'a> {
    pub(crate) fn new(value: &'a Value, path: &'a str, allowed: &[&str]) -> RuleResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            RuleError::deserialization(path, format!("expected an object, got {}", type_name(value)))
        })?;
        if let Some(unknown) = map.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(RuleError::deserialization(path, format!("unknown key '{}'", unknown)));
        }
        Ok(Self { map, path })
    }

    pub(crate) fn path(&self, key: &str) -> String {
        key_path(self.path, key)
    }

    /// Missing and `null` are the same.
    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn required(&self, key: &str) -> RuleResult<&'a Value> {
        self.get(key).ok_or_else(|| {
            RuleError::deserialization(self.path, format!("missing required key '{}'", key))
        })
    }

    pub(crate) fn string(&self, key: &str) -> RuleResult<&'a str> {
        let value = self.required(key)?;
        value.as_str().ok_or_else(|| self.wrong_type(key, "a string", value))
    }

    pub(crate) fn opt_string(&self, key: &str) -> RuleResult<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "a string", value)),
        }
    }

    pub(crate) fn opt_bool(&self, key: &str) -> RuleResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.wrong_type(key, "a boolean", value)),
        }
    }

    pub(crate) fn list(&self, key: &str) -> RuleResult<&'a [Value]> {
        let value = self.required(key)?;
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| self.wrong_type(key, "an array", value))
    }

    /// A missing list is empty.
    pub(crate) fn opt_list(&self, key: &str) -> RuleResult<&'a [Value]> {
        match self.get(key) {
            None => Ok(&[]),
            Some(_) => self.list(key),
        }
    }

    fn wrong_type(&self, key: &str, expected: &str, got: &Value) -> RuleError {
        RuleError::deserialization(
            self.path(key),
            format!("expected {}, got {}", expected, type_name(got)),
        )
    }
}
