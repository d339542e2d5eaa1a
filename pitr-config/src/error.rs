//! Error types for pitr-config.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pitr-config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration, resolving connection
/// settings, provisioning secrets, or synthesizing URIs.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document does not exist.
    #[error("Configuration document '{}' not found", .0.display())]
    DocumentNotFound(PathBuf),

    /// The configuration document exists but could not be read.
    #[error("Failed to read configuration document {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse {format} document at {}: {source}", path.display())]
    DocumentParse {
        format: String,
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No formatter handles the document's extension.
    #[error("Invalid or unsupported configuration format for file: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// None of the candidate sections exist in the document.
    #[error("Configuration section '{0}' not found")]
    MissingSection(String),

    /// A required field is absent from a section.
    #[error("Required field '{field}' missing from section '{section}'")]
    MissingField { section: String, field: String },

    /// A field is present but holds a value of the wrong shape.
    #[error("Field '{field}' in section '{section}' must be {expected}, found {found}")]
    InvalidField {
        section: String,
        field: String,
        expected: String,
        found: String,
    },

    /// A URI component is absent or rejected after resolution.
    #[error("Invalid URI component '{component}': {reason}")]
    InvalidComponent { component: String, reason: String },

    /// Reading or persisting a provisioned secret failed.
    #[error("Failed to provision secret at {}: {source}", path.display())]
    Secret {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Attach the section name to field-level errors.
    ///
    /// `FromValue` conversions don't know where a value came from, so they
    /// report an empty section and field; the resolver fills both in here.
    /// Other variants are returned unchanged.
    #[rustfmt::skip]
    pub fn in_field(self, section: &str, field: &str) -> Self {
        match self {
            Error::InvalidField { expected, found, .. } => Error::InvalidField { section: section.to_string(), field: field.to_string(), expected, found },
            other => other,
        }
    }

    pub(crate) fn invalid_value(expected: &str, found: &str) -> Self {
        Error::InvalidField {
            section: String::new(),
            field: String::new(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
