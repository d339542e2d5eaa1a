//! Generate-once secrets persisted to a file.
//!
//! The database password may be left out of the configuration. In that
//! case a random password is generated on first use and written to a
//! file; every later call, in this process or another, reads it back.
//!
//! Creation is atomic: the secret is written to a private temporary file
//! next to the target and then hard-linked into place. Linking fails if the
//! target already exists, so when several processes provision at once
//! exactly one value wins and the others adopt it. Readers never observe a
//! partially written file.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Where the database password is kept when the configuration omits it.
pub const DEFAULT_PASSWORD_FILE: &str = "ansible/.postgres-password";

/// Random bytes per generated secret (43 characters once encoded).
pub const SECRET_BYTES: usize = 32;

const TEMP_ATTEMPTS: usize = 16;
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Supplies a secret from a file, generating and persisting it on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretProvisioner {
    path: PathBuf,
}

impl Default for SecretProvisioner {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_FILE)
    }
}

impl SecretProvisioner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return `explicit` when given, otherwise the provisioned secret.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<String> {
        resolve_secret(explicit, &self.path)
    }

    /// Read the persisted secret, creating it if the file does not exist.
    ///
    /// Surrounding whitespace is trimmed from what is read. An empty file
    /// yields an empty secret; it is logged but not replaced.
    pub fn provision(&self) -> Result<String> {
        if let Some(secret) = read_secret(&self.path)? {
            return Ok(secret);
        }

        let secret = generate_secret();
        match persist_new(&self.path, &secret) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "generated new secret");
                Ok(secret)
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!(
                    path = %self.path.display(),
                    "secret created concurrently, using the existing value"
                );
                read_secret(&self.path)?.ok_or_else(|| self.error(ErrorKind::NotFound.into()))
            }
            Err(err) => Err(self.error(err)),
        }
    }

    fn error(&self, source: std::io::Error) -> Error {
        Error::Secret {
            path: self.path.clone(),
            source,
        }
    }
}

/// Return `explicit` unchanged when present, otherwise provision from `path`.
///
/// The file is not touched when an explicit value is supplied.
pub fn resolve_secret(explicit: Option<&str>, path: impl AsRef<Path>) -> Result<String> {
    match explicit {
        Some(value) => Ok(value.to_string()),
        None => SecretProvisioner::new(path.as_ref()).provision(),
    }
}

/// Generate a random URL-safe secret from the operating system's RNG.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn read_secret(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let secret = contents.trim();
            if secret.is_empty() {
                tracing::warn!(path = %path.display(), "secret file is empty");
            }
            Ok(Some(secret.to_string()))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Secret {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `secret` to `path` only if `path` does not exist yet.
///
/// Fails with `AlreadyExists` when another writer got there first.
fn persist_new(path: &Path, secret: &str) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    fs::create_dir_all(parent)?;

    let (temp_path, mut file) = create_temp(parent, path)?;
    let written = file
        .write_all(secret.as_bytes())
        .and_then(|()| file.sync_all())
        .and_then(|()| fs::hard_link(&temp_path, path));
    drop(file);

    if let Err(err) = fs::remove_file(&temp_path) {
        tracing::warn!(path = %temp_path.display(), error = %err, "failed to remove temporary secret file");
    }
    written
}

fn create_temp(parent: &Path, path: &Path) -> std::io::Result<(PathBuf, File)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "secret path has no file name"))?;

    for _ in 0..TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        match options.open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a temporary secret file",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_value_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");

        let secret = resolve_secret(Some("hunter2"), &path).unwrap();
        assert_eq!(secret, "hunter2");
        assert!(!path.exists());
    }

    #[test]
    fn test_existing_file_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        fs::write(&path, "  stored-secret \n").unwrap();

        let secret = SecretProvisioner::new(&path).provision().unwrap();
        assert_eq!(secret, "stored-secret");
        assert_eq!(fs::read_to_string(&path).unwrap(), "  stored-secret \n");
    }

    #[test]
    fn test_empty_file_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        fs::write(&path, "\n").unwrap();

        assert_eq!(SecretProvisioner::new(&path).provision().unwrap(), "");
        assert_eq!(fs::read_to_string(&path).unwrap(), "\n");
    }

    #[test]
    fn test_generates_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        let provisioner = SecretProvisioner::new(&path);

        let first = provisioner.provision().unwrap();
        let second = provisioner.provision().unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), first);
    }

    #[test]
    fn test_generated_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 43);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ansible").join("nested").join(".postgres-password");

        let secret = SecretProvisioner::new(&path).provision().unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), secret);
    }

    #[test]
    fn test_no_temporary_files_left() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        SecretProvisioner::new(&path).provision().unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(".postgres-password")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        SecretProvisioner::new(&path).provision().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = SecretProvisioner::new(dir.path()).provision().unwrap_err();
        assert!(matches!(err, Error::Secret { path, .. } if path == dir.path()));
    }

    #[test]
    fn test_concurrent_provisioning_converges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".postgres-password");
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    SecretProvisioner::new(path).provision().unwrap()
                })
            })
            .collect();

        let secrets: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(secrets.iter().all(|s| s == &secrets[0]));
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), secrets[0]);
    }
}
