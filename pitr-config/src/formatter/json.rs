//! JSON format support.

use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::value::{ConfigMap, ConfigValue};
use std::path::Path;

/// Formatter for JSON files.
///
/// Uses the `jzon` crate, whose objects keep insertion order.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn deserialize(&self, content: &str, origin: &Path) -> Result<ConfigValue> {
        let value = jzon::parse(content).map_err(|e| Error::DocumentParse {
            format: "JSON".to_string(),
            path: origin.to_path_buf(),
            source: e.to_string().into(),
        })?;
        Ok(jzon_to_config_value(&value))
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn jzon_to_config_value(value: &jzon::JsonValue) -> ConfigValue {
    use jzon::JsonValue;

    match value {
        JsonValue::Null => ConfigValue::Null,
        JsonValue::Boolean(b) => ConfigValue::Bool(*b),
        JsonValue::Number(_) => match value.as_i64() {
            Some(i) => ConfigValue::Integer(i),
            None => value.as_f64().map(ConfigValue::Float).unwrap_or(ConfigValue::Null),
        },
        JsonValue::Short(s) => ConfigValue::String(s.to_string()),
        JsonValue::String(s) => ConfigValue::String(s.clone()),
        JsonValue::Array(arr) => ConfigValue::Array(arr.iter().map(jzon_to_config_value).collect()),
        JsonValue::Object(obj) => {
            let map: ConfigMap = obj
                .iter()
                .map(|(k, v)| (k.to_string(), jzon_to_config_value(v)))
                .collect();
            ConfigValue::Object(map)
        }
    }
}
