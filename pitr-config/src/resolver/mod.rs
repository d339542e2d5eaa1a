//! Typed resolution of backend sections.
//!
//! A [`Resolver`] pairs a loaded [`ConfigDocument`] with a [`Schema`]. Each
//! accessor reads its field from the in-memory document at call time and
//! applies the schema's policy when the field is absent; nothing is cached
//! and nothing is written. The only side effect a resolver can trigger is a
//! computed policy, such as the password provisioner installed by
//! [`Schema::with_password_provisioner`].
//!
//! ```no_run
//! use pitr_config::{ConfigDocument, Resolver, Schema};
//!
//! let document = ConfigDocument::load("config.yml")?;
//! let db = Resolver::new(&document, Schema::database())?;
//! println!("{}", db.url()?);
//! # Ok::<(), pitr_config::Error>(())
//! ```

mod schema;
mod section;

pub use schema::{
    ComputeFn, Field, FieldPolicy, FieldRule, Schema, DEFAULT_BLOBSTORE_PORT,
    DEFAULT_DATABASE_PORT, DEFAULT_HOST, DEFAULT_MINIO_PORT,
};
pub use section::Section;

use crate::connection::{ConnectionConfig, QueryParams};
use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::value::{ConfigValue, FromValue};
use std::path::Path;

#[derive(Default)]
struct ResolvedFields {
    user: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    name: Option<String>,
    params: QueryParams,
    use_ssl: Option<bool>,
}

/// Resolves one backend section of a document according to a schema.
#[derive(Debug, Clone)]
pub struct Resolver {
    document: ConfigDocument,
    schema: Schema,
}

impl Resolver {
    /// Create a resolver over `document`.
    ///
    /// # Errors
    ///
    /// `MissingSection` if the schema's section is absent or not a mapping.
    pub fn new(document: &ConfigDocument, schema: Schema) -> Result<Self> {
        if document.section(schema.section()).is_none() {
            return Err(Error::MissingSection(schema.section().to_string()));
        }
        Ok(Self {
            document: document.clone(),
            schema,
        })
    }

    /// Load a document from `path` and create a resolver over it.
    ///
    /// Loader errors are returned unchanged.
    pub fn load(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        let document = ConfigDocument::load(path)?;
        Self::new(&document, schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Typed access to the raw section, for keys outside the schema.
    pub fn section(&self) -> Result<Section<'_>> {
        let name = self.schema.section();
        self.document
            .section(name)
            .map(|map| Section::new(name, map))
            .ok_or_else(|| Error::MissingSection(name.to_string()))
    }

    fn lookup(&self, field: Field) -> Result<Option<ConfigValue>> {
        let Some(rule) = self.schema.rule(field) else {
            return Ok(None);
        };
        let section = self.section()?;

        if let Some(value) = section.raw(rule.key) {
            return Ok(Some(value.clone()));
        }

        match &rule.policy {
            FieldPolicy::Required => Err(Error::MissingField {
                section: section.name().to_string(),
                field: rule.key.to_string(),
            }),
            FieldPolicy::Optional => Ok(None),
            FieldPolicy::Defaulted(value) => {
                tracing::debug!(
                    section = section.name(),
                    field = rule.key,
                    default = %value,
                    "field absent, using default"
                );
                Ok(Some(value.clone()))
            }
            FieldPolicy::Computed(compute) => {
                tracing::debug!(
                    section = section.name(),
                    field = rule.key,
                    "field absent, computing value"
                );
                compute(&section).map(Some)
            }
        }
    }

    fn typed<T: FromValue>(&self, field: Field) -> Result<Option<T>> {
        let Some(value) = self.lookup(field)? else {
            return Ok(None);
        };
        let key = self
            .schema
            .rule(field)
            .map_or(field.default_key(), |rule| rule.key);
        T::from_value(&value)
            .map(Some)
            .map_err(|e| e.in_field(self.schema.section(), key))
    }

    /// Fields every backend needs; a schema without a rule for one of them
    /// is reported as if the field were missing.
    fn essential<T: FromValue>(&self, field: Field) -> Result<T> {
        self.typed(field)?.ok_or_else(|| Error::MissingField {
            section: self.schema.section().to_string(),
            field: field.default_key().to_string(),
        })
    }

    pub fn user(&self) -> Result<Option<String>> {
        self.typed(Field::User)
    }

    pub fn password(&self) -> Result<String> {
        self.essential(Field::Password)
    }

    pub fn host(&self) -> Result<String> {
        self.essential(Field::Host)
    }

    pub fn port(&self) -> Result<u16> {
        self.essential(Field::Port)
    }

    pub fn name(&self) -> Result<Option<String>> {
        self.typed(Field::Name)
    }

    pub fn params(&self) -> Result<QueryParams> {
        Ok(self.typed(Field::Params)?.unwrap_or_default())
    }

    pub fn use_ssl(&self) -> Result<Option<bool>> {
        self.typed(Field::UseSsl)
    }

    /// Resolve every field into an immutable [`ConnectionConfig`].
    ///
    /// The first failing field aborts resolution; no partial result is
    /// returned. Computed fields are resolved after all others, so a
    /// document with a missing or malformed field fails before a password
    /// is provisioned.
    pub fn resolve(&self) -> Result<ConnectionConfig> {
        let (plain, computed): (Vec<&FieldRule>, Vec<&FieldRule>) = self
            .schema
            .rules()
            .iter()
            .partition(|rule| !matches!(rule.policy, FieldPolicy::Computed(_)));

        let mut fields = ResolvedFields::default();
        for rule in plain.into_iter().chain(computed) {
            match rule.field {
                Field::User => fields.user = self.user()?,
                Field::Password => fields.password = Some(self.password()?),
                Field::Host => fields.host = Some(self.host()?),
                Field::Port => fields.port = Some(self.port()?),
                Field::Name => fields.name = self.name()?,
                Field::Params => fields.params = self.params()?,
                Field::UseSsl => fields.use_ssl = self.use_ssl()?,
            }
        }

        // Fields without a rule still have to be present.
        let config = ConnectionConfig {
            kind: self.schema.kind(),
            host: fields.host.map_or_else(|| self.host(), Ok)?,
            port: fields.port.map_or_else(|| self.port(), Ok)?,
            password: fields.password.map_or_else(|| self.password(), Ok)?,
            user: fields.user,
            name: fields.name,
            params: fields.params,
            use_ssl: fields.use_ssl,
        };
        tracing::debug!(section = self.schema.section(), ?config, "resolved connection settings");
        Ok(config)
    }

    /// Resolve and serialize as a connection URI.
    pub fn url(&self) -> Result<String> {
        self.resolve()?.url()
    }
}
