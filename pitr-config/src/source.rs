//! Configuration source abstraction.
//!
//! A `Source` produces one layer of configuration data. The
//! [`DocumentBuilder`](crate::builder::DocumentBuilder) stacks layers so a
//! deployment can ship a base file and override single keys from the
//! environment.

use crate::document::parse_file;
use crate::error::{Error, Result};
use crate::value::{ConfigMap, ConfigValue};
use std::path::{Path, PathBuf};

/// A source of configuration data.
pub trait Source: Send + Sync {
    /// Load configuration data from this source.
    fn load(&self) -> Result<ConfigValue>;

    /// Get a human-readable name for this source (used in logs).
    fn name(&self) -> &str;
}

/// A configuration source that loads from a file.
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    /// Create a new file source from a path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.to_string_lossy().into_owned(),
            path,
        }
    }

    /// Get the path this source loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn load(&self) -> Result<ConfigValue> {
        parse_file(&self.path)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A file source that contributes nothing when the file is missing.
///
/// Parse errors in an existing file are still reported.
pub struct OptionalFileSource(FileSource);

impl OptionalFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(FileSource::new(path))
    }
}

impl Source for OptionalFileSource {
    fn load(&self) -> Result<ConfigValue> {
        match self.0.load() {
            Err(Error::DocumentNotFound(path)) => {
                tracing::debug!(path = %path.display(), "optional configuration file absent");
                Ok(ConfigValue::Object(ConfigMap::new()))
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

/// A configuration source that loads from environment variables.
///
/// Environment variables are converted to a nested structure using a separator.
/// For example, with prefix "PITR" and separator "__":
/// - `PITR__DB__HOST=db.internal` becomes `{ "db": { "host": "db.internal" } }`
///
/// Values are kept as text. Typed reads of ports and flags parse them, so
/// `PITR__DB__PASSWORD=123456` stays the string `"123456"`.
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    /// Create a new environment source with the given prefix.
    ///
    /// Uses "__" as the default separator for nested keys.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_separator(prefix, "__")
    }

    /// Create a new environment source with a custom separator.
    pub fn with_separator(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    /// Build the nested value from an explicit set of variables.
    ///
    /// Variables without the prefix are ignored.
    pub fn from_vars<I, K, V>(&self, vars: I) -> ConfigValue
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut root = ConfigMap::new();

        for (key, value) in vars {
            let Some(path) = key.as_ref().strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }
            let path = path.to_lowercase();
            let parts: Vec<&str> = path.split(&self.separator.to_lowercase()).collect();
            insert_nested(&mut root, &parts, ConfigValue::String(value.into()));
        }

        ConfigValue::Object(root)
    }
}

fn insert_nested(obj: &mut ConfigMap, path: &[&str], value: ConfigValue) {
    match path {
        [] => {}
        [leaf] => {
            obj.insert(*leaf, value);
        }
        [head, rest @ ..] => insert_nested(obj.object_entry(head), rest, value),
    }
}

impl Source for EnvSource {
    fn load(&self) -> Result<ConfigValue> {
        Ok(self.from_vars(std::env::vars()))
    }

    fn name(&self) -> &str {
        &self.prefix
    }
}

/// A configuration source that holds data in memory.
///
/// Useful for testing or providing default values.
pub struct MemorySource {
    data: ConfigValue,
    source_name: String,
}

impl MemorySource {
    /// Create a new memory source with the given data.
    pub fn new(data: ConfigValue) -> Self {
        Self::with_name(data, "memory")
    }

    /// Create a new memory source with a custom name.
    pub fn with_name(data: ConfigValue, name: impl Into<String>) -> Self {
        Self {
            data,
            source_name: name.into(),
        }
    }
}

impl Source for MemorySource {
    fn load(&self) -> Result<ConfigValue> {
        Ok(self.data.clone())
    }

    fn name(&self) -> &str {
        &self.source_name
    }
}
