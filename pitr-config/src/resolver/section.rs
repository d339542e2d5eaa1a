use crate::error::{Error, Result};
use crate::value::{ConfigMap, ConfigValue, FromValue};

/// Typed, read-only access to one sub-section of a document.
///
/// A `null` value is treated the same as an absent key, so `password:`
/// with nothing after it counts as "not configured".
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    name: &'a str,
    map: &'a ConfigMap,
}

impl<'a> Section<'a> {
    pub fn new(name: &'a str, map: &'a ConfigMap) -> Self {
        Self { name, map }
    }

    /// The section's path in the document, used in error messages.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The raw value for a field, or `None` if absent or null.
    pub fn raw(&self, field: &str) -> Option<&'a ConfigValue> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    /// Read a field if it is present.
    pub fn get<T: FromValue>(&self, field: &str) -> Result<Option<T>> {
        self.raw(field)
            .map(|value| T::from_value(value).map_err(|e| e.in_field(self.name, field)))
            .transpose()
    }

    /// Read a field that must be present.
    pub fn required<T: FromValue>(&self, field: &str) -> Result<T> {
        self.get(field)?.ok_or_else(|| Error::MissingField {
            section: self.name.to_string(),
            field: field.to_string(),
        })
    }

    /// Read a field, falling back to `default` when it is absent.
    pub fn optional<T: FromValue>(&self, field: &str, default: T) -> Result<T> {
        Ok(self.get(field)?.unwrap_or(default))
    }

    /// Read a scalar field as text.
    ///
    /// Version numbers are often written unquoted (`version: 11`), so
    /// integers, floats and booleans are accepted and rendered as strings.
    pub fn text(&self, field: &str) -> Result<Option<String>> {
        self.raw(field)
            .map(|value| {
                value.to_plain_string().ok_or_else(|| {
                    Error::invalid_value("a scalar", value.type_name()).in_field(self.name, field)
                })
            })
            .transpose()
    }
}
