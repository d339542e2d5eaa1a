//! Per-field resolution policies.
//!
//! The configuration layout changed several times over the life of the
//! rig: the host went from required to defaulted, the object store section
//! was renamed from `minio` to `blobstore`, and `use_ssl` was added. Each
//! layout is a [`Schema`] value rather than its own type, so the resolver
//! logic stays the same for all of them.

use crate::connection::BackendKind;
use crate::error::Result;
use crate::resolver::Section;
use crate::secret::SecretProvisioner;
use crate::value::{ConfigMap, ConfigValue};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_BLOBSTORE_PORT: u16 = 443;
pub const DEFAULT_MINIO_PORT: u16 = 9000;
pub const DEFAULT_HOST: &str = "localhost";

/// A field of [`ConnectionConfig`](crate::connection::ConnectionConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    User,
    Password,
    Host,
    Port,
    Name,
    Params,
    UseSsl,
}

impl Field {
    /// The document key this field is read from unless a schema says otherwise.
    pub fn default_key(self) -> &'static str {
        match self {
            Field::User => "user",
            Field::Password => "password",
            Field::Host => "host",
            Field::Port => "port",
            Field::Name => "name",
            Field::Params => "params",
            Field::UseSsl => "use_ssl",
        }
    }
}

/// Signature of a computed fallback.
pub type ComputeFn = dyn Fn(&Section<'_>) -> Result<ConfigValue> + Send + Sync;

/// What to do when a field is absent from the document.
#[derive(Clone)]
pub enum FieldPolicy {
    /// Fail with `MissingField`.
    Required,
    /// Leave the field unset.
    Optional,
    /// Use a fixed value.
    Defaulted(ConfigValue),
    /// Derive a value; only called when the field is absent.
    Computed(Arc<ComputeFn>),
}

impl FieldPolicy {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Section<'_>) -> Result<ConfigValue> + Send + Sync + 'static,
    {
        FieldPolicy::Computed(Arc::new(f))
    }
}

impl fmt::Debug for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPolicy::Required => write!(f, "Required"),
            FieldPolicy::Optional => write!(f, "Optional"),
            FieldPolicy::Defaulted(v) => write!(f, "Defaulted({})", v),
            FieldPolicy::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

/// One row of a schema: which key feeds a field and how absence is handled.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub key: &'static str,
    pub policy: FieldPolicy,
}

/// A resolution table for one backend section.
///
/// Fields without a rule do not apply to the backend (for example `name`
/// for blob storage) and always resolve to nothing.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: BackendKind,
    section: String,
    rules: Vec<FieldRule>,
}

impl Schema {
    /// An empty table for `kind`, reading from the section at `section`
    /// (dot notation).
    pub fn new(kind: BackendKind, section: impl Into<String>) -> Self {
        Self {
            kind,
            section: section.into(),
            rules: Vec::new(),
        }
    }

    /// The `db` section: host defaults to `localhost`, port to 5432,
    /// params to an empty mapping; user, password and name are required.
    pub fn database() -> Self {
        Self::new(BackendKind::Database, "db")
            .with_policy(Field::User, FieldPolicy::Required)
            .with_policy(Field::Password, FieldPolicy::Required)
            .with_policy(Field::Host, FieldPolicy::Defaulted(DEFAULT_HOST.into()))
            .with_policy(Field::Port, FieldPolicy::Defaulted(DEFAULT_DATABASE_PORT.into()))
            .with_policy(Field::Name, FieldPolicy::Required)
            .with_policy(Field::Params, FieldPolicy::Defaulted(ConfigMap::new().into()))
    }

    /// Like [`database`](Self::database) but the host must be configured.
    pub fn database_strict() -> Self {
        Self::database().with_policy(Field::Host, FieldPolicy::Required)
    }

    /// The `blobstore` section: host, access key, secret key and `use_ssl`
    /// are required; the port defaults to 443.
    pub fn blobstore() -> Self {
        Self::new(BackendKind::Blobstore, "blobstore")
            .with_rule(Field::User, "access_key", FieldPolicy::Required)
            .with_rule(Field::Password, "secret_key", FieldPolicy::Required)
            .with_policy(Field::Host, FieldPolicy::Required)
            .with_policy(Field::Port, FieldPolicy::Defaulted(DEFAULT_BLOBSTORE_PORT.into()))
            .with_policy(Field::UseSsl, FieldPolicy::Required)
    }

    /// The older `minio` section: port defaults to 9000 and `use_ssl`,
    /// which that layout did not have, defaults to `false`.
    pub fn minio() -> Self {
        Self::blobstore()
            .at_section("minio")
            .with_policy(Field::Port, FieldPolicy::Defaulted(DEFAULT_MINIO_PORT.into()))
            .with_policy(Field::UseSsl, FieldPolicy::Defaulted(false.into()))
    }

    /// Replace the policy for `field`, keeping its key. Adds a rule using
    /// the field's default key if there was none.
    pub fn with_policy(self, field: Field, policy: FieldPolicy) -> Self {
        let key = self
            .rule(field)
            .map(|rule| rule.key)
            .unwrap_or_else(|| field.default_key());
        self.with_rule(field, key, policy)
    }

    /// Replace (or add) the rule for `field`.
    pub fn with_rule(mut self, field: Field, key: &'static str, policy: FieldPolicy) -> Self {
        let rule = FieldRule { field, key, policy };
        match self.rules.iter_mut().find(|r| r.field == field) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// Make the password fall back to `provisioner` when the document has none.
    pub fn with_password_provisioner(self, provisioner: SecretProvisioner) -> Self {
        self.with_policy(
            Field::Password,
            FieldPolicy::computed(move |_| provisioner.provision().map(ConfigValue::String)),
        )
    }

    /// Read from a different section path.
    pub fn at_section(mut self, section: impl Into<String>) -> Self {
        self.section = section.into();
        self
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn rule(&self, field: Field) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }
}
