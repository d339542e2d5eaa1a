//! The PITR rig's configuration file.
//!
//! [`PitrConfig`] wraps a loaded document and knows which sections the rig
//! reads: `db`, `blobstore` (or the older `minio`), and `pgbackrest`.

use crate::discovery;
use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::resolver::{Resolver, Schema, Section};
use crate::secret::{SecretProvisioner, DEFAULT_PASSWORD_FILE};
use std::path::{Path, PathBuf};

const DB_SECTION: &str = "db";
const BLOBSTORE_SECTION: &str = "blobstore";
const MINIO_SECTION: &str = "minio";
const PGBACKREST_SECTION: &str = "pgbackrest";

/// Typed access to the rig's configuration.
///
/// ```no_run
/// use pitr_config::PitrConfig;
///
/// let config = PitrConfig::load("config.yml")?;
/// println!("{}", config.database_url()?);
/// println!("{}", config.blobstore_url()?);
/// println!("stanza {}", config.stanza()?);
/// # Ok::<(), pitr_config::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PitrConfig {
    document: ConfigDocument,
    password_file: PathBuf,
}

impl PitrConfig {
    /// Load the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ConfigDocument::load(path).map(Self::from_document)
    }

    /// Find a configuration file by name in the standard locations and load it.
    pub fn discover(name: &str) -> Result<Self> {
        let path = discovery::find_config_file(name)?;
        Self::load(path)
    }

    pub fn from_document(document: ConfigDocument) -> Self {
        Self {
            document,
            password_file: PathBuf::from(DEFAULT_PASSWORD_FILE),
        }
    }

    /// Where a generated database password is kept when `db.password` is
    /// not configured. Defaults to `ansible/.postgres-password`.
    pub fn with_password_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.password_file = path.into();
        self
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn password_file(&self) -> &Path {
        &self.password_file
    }

    /// Resolver for the `db` section.
    ///
    /// A missing `db.password` is provisioned from the password file the
    /// first time it is needed.
    pub fn database(&self) -> Result<Resolver> {
        let schema = Schema::database()
            .with_password_provisioner(SecretProvisioner::new(&self.password_file));
        Resolver::new(&self.document, schema)
    }

    /// Resolver for object storage: the `blobstore` section if present,
    /// otherwise the older `minio` section.
    pub fn blobstore(&self) -> Result<Resolver> {
        if self.document.section(BLOBSTORE_SECTION).is_some() {
            return Resolver::new(&self.document, Schema::blobstore());
        }
        if self.document.section(MINIO_SECTION).is_some() {
            tracing::debug!("no blobstore section, falling back to minio");
            return Resolver::new(&self.document, Schema::minio());
        }
        Err(Error::MissingSection(BLOBSTORE_SECTION.to_string()))
    }

    pub fn database_url(&self) -> Result<String> {
        self.database()?.url()
    }

    pub fn blobstore_url(&self) -> Result<String> {
        self.blobstore()?.url()
    }

    /// The PostgreSQL major version (`db.version`), as text.
    pub fn db_version(&self) -> Result<Option<String>> {
        self.section(DB_SECTION)?.text("version")
    }

    /// The cluster name (`db.cluster_name`).
    pub fn cluster_name(&self) -> Result<Option<String>> {
        self.section(DB_SECTION)?.get("cluster_name")
    }

    /// The pgBackRest stanza (`pgbackrest.stanza`).
    pub fn stanza(&self) -> Result<String> {
        self.section(PGBACKREST_SECTION)?.required("stanza")
    }

    fn section<'a>(&'a self, name: &'a str) -> Result<Section<'a>> {
        self.document
            .section(name)
            .map(|map| Section::new(name, map))
            .ok_or_else(|| Error::MissingSection(name.to_string()))
    }
}
