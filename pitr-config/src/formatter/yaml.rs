//! YAML format support.

use crate::error::{Error, Result};
use crate::formatter::Formatter;
use crate::value::{ConfigMap, ConfigValue};
use std::path::Path;

/// Formatter for YAML files.
///
/// Uses the `yaml-rust2` crate (no serde dependency). Handles multi-document
/// files by using the first document. Mapping order is kept as written and
/// non-string keys are converted to strings.
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn deserialize(&self, content: &str, origin: &Path) -> Result<ConfigValue> {
        use yaml_rust2::YamlLoader;

        let docs = YamlLoader::load_from_str(content).map_err(|e| Error::DocumentParse {
            format: "YAML".to_string(),
            path: origin.to_path_buf(),
            source: e.to_string().into(),
        })?;

        match docs.into_iter().next() {
            Some(doc) => Ok(yaml_to_config_value(doc)),
            None => Ok(ConfigValue::Object(ConfigMap::new())),
        }
    }

    fn name(&self) -> &str {
        "yaml"
    }
}

fn yaml_to_config_value(yaml: yaml_rust2::Yaml) -> ConfigValue {
    use yaml_rust2::Yaml;

    match yaml {
        Yaml::Null | Yaml::BadValue => ConfigValue::Null,
        Yaml::Boolean(b) => ConfigValue::Bool(b),
        Yaml::Integer(i) => ConfigValue::Integer(i),
        Yaml::Real(s) => s
            .parse::<f64>()
            .map(ConfigValue::Float)
            .unwrap_or(ConfigValue::String(s)),
        Yaml::String(s) => ConfigValue::String(s),
        Yaml::Array(arr) => ConfigValue::Array(arr.into_iter().map(yaml_to_config_value).collect()),
        Yaml::Hash(map) => {
            let obj: ConfigMap = map
                .into_iter()
                .filter_map(|(k, v)| {
                    let key = match k {
                        Yaml::String(s) => s,
                        Yaml::Integer(i) => i.to_string(),
                        Yaml::Real(r) => r,
                        Yaml::Boolean(b) => b.to_string(),
                        _ => return None,
                    };
                    Some((key, yaml_to_config_value(v)))
                })
                .collect();
            ConfigValue::Object(obj)
        }
        Yaml::Alias(_) => {
            unreachable!("YAML aliases are resolved by parser before reaching this code")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigValue> {
        YamlFormatter.deserialize(content, Path::new("test.yml"))
    }

    #[test]
    fn test_provides() {
        let f = YamlFormatter;
        assert!(f.provides(Path::new("config.yaml")));
        assert!(f.provides(Path::new("config.yml")));
        assert!(!f.provides(Path::new("config.json")));
    }

    #[test]
    fn test_deserialize_nested_sections() {
        let result = parse("db:\n  user: alice\n  port: 5433\nminio:\n  use_ssl: true").unwrap();
        let db = result.get("db").unwrap();
        assert_eq!(db.get("user").unwrap().as_str(), Some("alice"));
        assert_eq!(db.get("port").unwrap().as_i64(), Some(5433));
        assert_eq!(
            result.get("minio").unwrap().get("use_ssl").unwrap().as_bool(),
            Some(true)
        );
    }

    #[test]
    fn test_deserialize_keeps_mapping_order() {
        let result = parse("params:\n  sslmode: require\n  application_name: pitr\n  connect_timeout: 10").unwrap();
        let params = result.get("params").unwrap().as_object().unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["sslmode", "application_name", "connect_timeout"]
        );
    }

    #[test]
    fn test_deserialize_empty() {
        let result = parse("").unwrap();
        assert!(result.as_object().is_some());
    }

    #[test]
    fn test_deserialize_null_value() {
        let result = parse("db:\n  password:\n").unwrap();
        assert!(result.get("db").unwrap().get("password").unwrap().is_null());
    }

    #[test]
    fn test_deserialize_error_carries_origin() {
        let err = parse("---\n- :\n  a: [}").unwrap_err();
        match err {
            Error::DocumentParse { format, path, .. } => {
                assert_eq!(format, "YAML");
                assert_eq!(path, Path::new("test.yml"));
            }
            other => panic!("expected DocumentParse, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_non_string_keys() {
        let result = parse("42: int_key\ntrue: bool_key").unwrap();
        assert_eq!(result.get("42").unwrap().as_str(), Some("int_key"));
        assert_eq!(result.get("true").unwrap().as_str(), Some("bool_key"));
    }
}
