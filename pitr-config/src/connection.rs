//! Resolved connection settings.

use crate::error::{Error, Result};
use crate::uri;
use crate::value::{ConfigValue, FromValue};
use std::fmt;

/// The kind of backend a connection points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// A PostgreSQL database, addressed with the `postgres` scheme.
    Database,
    /// An S3-compatible object store, addressed over `http` or `https`.
    Blobstore,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Database => write!(f, "database"),
            BackendKind::Blobstore => write!(f, "blobstore"),
        }
    }
}

/// Extra query parameters, kept in the order they were configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl FromValue for QueryParams {
    /// Reads a mapping of scalars. Numbers and booleans are rendered as
    /// text; nested values are rejected.
    fn from_value(value: &ConfigValue) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::invalid_value("a mapping", value.type_name()))?;
        map.iter()
            .map(|(k, v)| {
                v.to_plain_string()
                    .map(|text| (k.clone(), text))
                    .ok_or_else(|| {
                        Error::invalid_value(
                            "a mapping of scalar values",
                            &format!("{} at '{}'", v.type_name(), k),
                        )
                    })
            })
            .collect()
    }
}

/// Fully resolved settings for one backend.
///
/// Produced by [`Resolver::resolve`](crate::resolver::Resolver::resolve);
/// every required field has been checked and defaults applied. There is no
/// way to change a value after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub(crate) kind: BackendKind,
    pub(crate) user: Option<String>,
    pub(crate) password: String,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) name: Option<String>,
    pub(crate) params: QueryParams,
    pub(crate) use_ssl: Option<bool>,
}

impl ConnectionConfig {
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// The database user, or the access key for blob storage.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The database password, or the secret key for blob storage.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The database name; always `None` for blob storage.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Whether blob storage is reached over TLS; `None` for databases.
    pub fn use_ssl(&self) -> Option<bool> {
        self.use_ssl
    }

    /// Alias of [`user`](Self::user) for blob storage settings.
    pub fn access_key(&self) -> Option<&str> {
        self.user()
    }

    /// Alias of [`password`](Self::password) for blob storage settings.
    pub fn secret_key(&self) -> &str {
        self.password()
    }

    /// Serialize these settings as a connection URI.
    pub fn url(&self) -> Result<String> {
        uri::synthesize(self)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("kind", &self.kind)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}
