//! Document builder for composing multiple sources.
//!
//! The `DocumentBuilder` provides a fluent API for creating a
//! [`ConfigDocument`] from several layers, with later layers overriding
//! earlier ones.

use crate::document::ConfigDocument;
use crate::error::Result;
use crate::source::{EnvSource, FileSource, MemorySource, OptionalFileSource, Source};
use crate::value::{ConfigMap, ConfigValue};
use std::path::Path;

/// A builder for creating `ConfigDocument` instances from multiple sources.
///
/// Sources are layered in the order they are added. Nested objects are
/// merged key by key; any other value (including arrays) from a later
/// layer replaces the earlier one.
///
/// # Examples
///
/// ```no_run
/// use pitr_config::DocumentBuilder;
///
/// let document = DocumentBuilder::new()
///     .add_file("config.yml")
///     .add_optional_file("config.local.yml")
///     .add_env("PITR")
///     .build()?;
///
/// let host: String = document.get("db.host")?;
/// # Ok::<(), pitr_config::Error>(())
/// ```
pub struct DocumentBuilder {
    sources: Vec<Box<dyn Source>>,
}

impl DocumentBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a source to the document.
    ///
    /// Sources added later override values from sources added earlier.
    pub fn add_source<S: Source + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add a required file by path; the format is chosen by extension.
    pub fn add_file(self, path: impl AsRef<Path>) -> Self {
        self.add_source(FileSource::new(path))
    }

    /// Add a file that may or may not exist.
    pub fn add_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.add_source(OptionalFileSource::new(path))
    }

    /// Add environment variables with the given prefix.
    ///
    /// `PITR__DB__HOST` becomes `db.host` for prefix `"PITR"`.
    pub fn add_env(self, prefix: impl Into<String>) -> Self {
        self.add_source(EnvSource::new(prefix))
    }

    /// Add environment variables with a custom separator.
    pub fn add_env_with_separator(
        self,
        prefix: impl Into<String>,
        separator: impl Into<String>,
    ) -> Self {
        self.add_source(EnvSource::with_separator(prefix, separator))
    }

    /// Add in-memory default values.
    pub fn add_defaults(self, defaults: ConfigValue) -> Self {
        self.add_source(MemorySource::with_name(defaults, "defaults"))
    }

    /// Load every source in order and merge them into one document.
    ///
    /// The first failing source aborts the build; its error is returned
    /// unchanged.
    pub fn build(self) -> Result<ConfigDocument> {
        let mut merged = ConfigValue::Object(ConfigMap::new());

        for source in &self.sources {
            let value = source.load()?;
            tracing::debug!(source = source.name(), "merging configuration layer");
            merge_values(&mut merged, value);
        }

        Ok(ConfigDocument::new(merged))
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep merge two ConfigValues, with `overlay` taking precedence.
fn merge_values(base: &mut ConfigValue, overlay: ConfigValue) {
    match (base, overlay) {
        (ConfigValue::Object(base_obj), ConfigValue::Object(overlay_obj)) => {
            for (key, overlay_value) in overlay_obj {
                match base_obj.get_mut(&key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_obj.insert(key, overlay_value);
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay;
        }
    }
}
