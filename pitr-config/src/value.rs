//! Configuration value types and conversion traits.
//!
//! This module provides the `ConfigValue` tree produced by the document
//! loader, the order-preserving `ConfigMap` used for its objects, and the
//! `FromValue` trait for reading values as Rust types.

use crate::error::{Error, Result};
use std::fmt;

/// A configuration value that can represent any supported type.
///
/// This is the core type used for representing parsed configuration data.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    /// Null/missing value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed 64-bit integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered array of values
    Array(Vec<ConfigValue>),
    /// Key-value object, in document order
    Object(ConfigMap),
}

impl ConfigValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns the boolean value if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the array if this is an Array.
    pub fn as_array(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the object if this is an Object.
    pub fn as_object(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Get a value from an object by key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Renders a scalar as plain text (no quoting).
    ///
    /// Returns `None` for null, arrays and objects.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Integer(n) => Some(n.to_string()),
            ConfigValue::Float(n) => Some(n.to_string()),
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Null | ConfigValue::Array(_) | ConfigValue::Object(_) => None,
        }
    }

    /// Returns a human-readable type name for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Array(_) => "array",
            ConfigValue::Object(_) => "object",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(n) => write!(f, "{}", n),
            ConfigValue::Float(n) => write!(f, "{}", n),
            ConfigValue::String(s) => write!(f, "\"{}\"", s),
            ConfigValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            ConfigValue::Object(obj) => {
                write!(f, "{{")?;
                for (i, (k, v)) in obj.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Integer(v)
    }
}

impl From<u16> for ConfigValue {
    fn from(v: u16) -> Self {
        ConfigValue::Integer(i64::from(v))
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(v: ConfigMap) -> Self {
        ConfigValue::Object(v)
    }
}

// ============================================================================
// ConfigMap
// ============================================================================

/// An object whose entries keep the order they were inserted in.
///
/// Query parameters are emitted in document order, so the loader must not
/// lose it. Lookups are linear; configuration sections are small.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a value, returning the previous one.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get the object stored under `key`, inserting an empty one when the
    /// key is absent or holds a non-object.
    pub fn object_entry(&mut self, key: &str) -> &mut ConfigMap {
        if !matches!(self.get(key), Some(ConfigValue::Object(_))) {
            self.insert(key, ConfigValue::Object(ConfigMap::new()));
        }
        match self.get_mut(key) {
            Some(ConfigValue::Object(map)) => map,
            _ => unreachable!("object entry was just inserted"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, ConfigValue);
    type IntoIter = std::vec::IntoIter<(String, ConfigValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ============================================================================
// FromValue trait and implementations
// ============================================================================

/// Trait for types that can be constructed from a `ConfigValue`.
///
/// Errors are reported as `Error::InvalidField` with an empty section and
/// field; callers that know the location attach it with `Error::in_field`.
pub trait FromValue: Sized {
    /// Attempt to construct Self from a configuration value.
    fn from_value(value: &ConfigValue) -> Result<Self>;
}

impl FromValue for bool {
    /// Accepts a boolean, or the text `true`/`false` in any case as written
    /// by environment overrides.
    fn from_value(value: &ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Bool(b) => Ok(*b),
            ConfigValue::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            ConfigValue::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(Error::invalid_value("a boolean", &found(other))),
        }
    }
}

impl FromValue for i64 {
    /// Accepts an integer, or text holding one.
    fn from_value(value: &ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Integer(n) => Ok(*n),
            ConfigValue::String(s) => s
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value("an integer", &found(value))),
            other => Err(Error::invalid_value("an integer", other.type_name())),
        }
    }
}

impl FromValue for u16 {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        let n = i64::from_value(value)?;
        u16::try_from(n).map_err(|_| Error::invalid_value("an integer in 0..=65535", &n.to_string()))
    }
}

fn found(value: &ConfigValue) -> String {
    match value {
        ConfigValue::String(s) => format!("string '{}'", s),
        other => other.type_name().to_string(),
    }
}

impl FromValue for String {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::invalid_value("a string", value.type_name()))
    }
}

impl FromValue for ConfigValue {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for ConfigMap {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| Error::invalid_value("a mapping", value.type_name()))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        let arr = value
            .as_array()
            .ok_or_else(|| Error::invalid_value("a sequence", value.type_name()))?;
        arr.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &ConfigValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
