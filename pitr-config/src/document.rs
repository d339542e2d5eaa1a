//! The loaded configuration document.

use crate::error::{Error, Result};
use crate::formatter;
use crate::value::{ConfigMap, ConfigValue, FromValue};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An immutable tree of configuration values.
///
/// A document is created once (by [`ConfigDocument::load`] or the
/// [`DocumentBuilder`](crate::builder::DocumentBuilder)) and never changes
/// afterwards. Clones share the same tree, so a document can be handed to
/// any number of resolvers without copying or locking.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Arc<ConfigMap>,
    source_path: Option<PathBuf>,
}

impl ConfigDocument {
    /// Wrap a value as a document.
    ///
    /// A non-object root (e.g. a YAML file holding a bare list) becomes an
    /// empty document; every lookup on it reports missing sections.
    pub fn new(root: ConfigValue) -> Self {
        let root = match root {
            ConfigValue::Object(map) => map,
            _ => ConfigMap::new(),
        };
        Self {
            root: Arc::new(root),
            source_path: None,
        }
    }

    pub(crate) fn with_source(root: ConfigValue, path: PathBuf) -> Self {
        Self {
            source_path: Some(path),
            ..Self::new(root)
        }
    }

    /// Load a document from a file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound` if the file does not exist
    /// - `DocumentRead` for any other I/O failure
    /// - `UnsupportedFormat` if no formatter handles the extension
    /// - `DocumentParse` if the content is malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = parse_file(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration document");
        Ok(Self::with_source(data, path.to_path_buf()))
    }

    /// Parse a document from a string in the given format (`"yaml"` or `"json"`).
    pub fn from_str_with_format(content: &str, format: &str) -> Result<Self> {
        let origin = PathBuf::from(format!("<memory>.{format}"));
        let formatter =
            formatter::formatter_for(&origin).ok_or_else(|| Error::UnsupportedFormat(origin.clone()))?;
        Ok(Self::new(formatter.deserialize(content, &origin)?))
    }

    /// Parse a YAML document from a string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, "yaml")
    }

    /// The file this document was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// The top-level mapping.
    pub fn root(&self) -> &ConfigMap {
        &self.root
    }

    /// Get a raw value by key using dot notation (`"db.params.sslmode"`).
    pub fn get_value(&self, key: &str) -> Option<&ConfigValue> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a typed value by key using dot notation.
    ///
    /// Absent keys are reported as `MissingField`, with everything before
    /// the last dot as the section.
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        let (section, field) = key.rsplit_once('.').unwrap_or(("", key));
        let value = self.get_value(key).ok_or_else(|| Error::MissingField {
            section: section.to_string(),
            field: field.to_string(),
        })?;
        T::from_value(value).map_err(|e| e.in_field(section, field))
    }

    /// Check whether a key exists (dot notation).
    pub fn has_key(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Get the mapping stored at a dot-notation path.
    pub fn section(&self, path: &str) -> Option<&ConfigMap> {
        self.get_value(path).and_then(ConfigValue::as_object)
    }
}

/// Read and parse a file into a `ConfigValue`.
pub(crate) fn parse_file(path: &Path) -> Result<ConfigValue> {
    let formatter =
        formatter::formatter_for(path).ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;

    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::DocumentNotFound(path.to_path_buf())
        } else {
            Error::DocumentRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    formatter.deserialize(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_load_yaml_file() {
        let mut file = Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "db:\n  user: alice\n  name: orders").unwrap();

        let doc = ConfigDocument::load(file.path()).unwrap();
        assert_eq!(doc.get::<String>("db.user").unwrap(), "alice");
        assert_eq!(doc.source_path(), Some(file.path()));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        let err = ConfigDocument::load(&path).unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(p) if p == path));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let file = Builder::new().suffix(".ini").tempfile().unwrap();
        let err = ConfigDocument::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "db: [unclosed").unwrap();
        let err = ConfigDocument::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::DocumentParse { path, .. } if path == file.path()));
    }

    #[test]
    fn test_get_missing_key_names_section() {
        let doc = ConfigDocument::from_yaml("db:\n  user: alice").unwrap();
        match doc.get::<String>("db.name").unwrap_err() {
            Error::MissingField { section, field } => {
                assert_eq!(section, "db");
                assert_eq!(field, "name");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_get_wrong_type() {
        let doc = ConfigDocument::from_yaml("db:\n  port: fivefourthreetwo").unwrap();
        let err = doc.get::<u16>("db.port").unwrap_err();
        assert!(matches!(err, Error::InvalidField { field, .. } if field == "port"));
    }

    #[test]
    fn test_section_and_has_key() {
        let doc = ConfigDocument::from_yaml("pgbackrest:\n  stanza: pitr").unwrap();
        assert!(doc.has_key("pgbackrest.stanza"));
        assert!(!doc.has_key("pgbackrest.repo"));
        assert!(doc.section("pgbackrest").is_some());
        assert!(doc.section("pgbackrest.stanza").is_none());
    }

    #[test]
    fn test_non_object_root_is_empty() {
        let doc = ConfigDocument::from_yaml("- a\n- b").unwrap();
        assert!(doc.root().is_empty());
    }

    #[test]
    fn test_clones_share_tree() {
        let doc = ConfigDocument::from_yaml("db:\n  user: alice").unwrap();
        let other = doc.clone();
        assert!(std::ptr::eq(doc.root(), other.root()));
    }
}
