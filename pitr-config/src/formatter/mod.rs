//! Document format abstraction.
//!
//! The `Formatter` trait separates format parsing from document loading.
//! Each formatter declares which file extensions it handles, and the loader
//! picks the first one that `provides()` for a given path.
//!
//! Built-in formatters:
//! - `YamlFormatter`: `.yaml`, `.yml`
//! - `JsonFormatter`: `.json`

pub mod json;
pub mod yaml;

use crate::error::Result;
use crate::value::ConfigValue;
use std::path::Path;

/// A format parser for configuration documents.
///
/// Formatters are stateless; they parse raw content strings into a
/// `ConfigValue`. The `origin` path is only used for error reporting.
pub trait Formatter: Send + Sync + 'static {
    /// Whether this formatter can handle the given path.
    fn provides(&self, path: &Path) -> bool {
        extension_matches(path, self.extensions())
    }

    /// File extensions this formatter handles (without the leading dot).
    fn extensions(&self) -> &[&str];

    /// Parse a content string into a `ConfigValue`.
    fn deserialize(&self, content: &str, origin: &Path) -> Result<ConfigValue>;

    /// Human-readable name for error messages.
    fn name(&self) -> &str;
}

static FORMATTERS: &[&dyn Formatter] = &[&yaml::YamlFormatter, &json::JsonFormatter];

/// All built-in formatters, YAML first.
pub fn formatters() -> &'static [&'static dyn Formatter] {
    FORMATTERS
}

/// Find the formatter responsible for `path`, if any.
pub fn formatter_for(path: &Path) -> Option<&'static dyn Formatter> {
    FORMATTERS.iter().copied().find(|f| f.provides(path))
}

/// Check whether a path's file extension matches any of the given extensions.
pub fn extension_matches(path: &Path, extensions: &[&str]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(e) => e,
        None => return false,
    };
    extensions.iter().any(|supported| *supported == ext)
}
