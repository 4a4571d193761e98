//! [`KeyStore`]: local key material for receiving bound secrets.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/            0700
//! ├── config.json        0600   {"userId": "...", "createdAt": <epoch ms>}
//! └── key.pem            0600   PKCS#8 private key
//! ```
//!
//! # Security invariants
//!
//! - The private key is read from disk on demand and held in a zeroizing
//!   buffer only for the operation that needs it.
//! - It is never logged or included in `Debug` output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hidr_common::HidrError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

const IDENTITY_FILE: &str = "config.json";
const PRIVATE_KEY_FILE: &str = "key.pem";

/// Errors produced by the key store.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity file {0} is corrupt")]
    CorruptIdentity(PathBuf),
}

impl From<KeyStoreError> for HidrError {
    fn from(e: KeyStoreError) -> Self {
        match e {
            KeyStoreError::Io { source, .. } => HidrError::Io(source),
            other => HidrError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    user_id: String,
    #[serde(default)]
    created_at: i64,
}

/// PKCS#8 PEM private key, zeroed on drop.
#[derive(Clone)]
pub struct PrivateKeyPem(Zeroizing<String>);

impl PrivateKeyPem {
    pub fn new(pem: Zeroizing<String>) -> Self {
        Self(pem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKeyPem([REDACTED])")
    }
}

/// File-backed store for the holder identity and private key.
#[derive(Clone, Debug)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Create a store rooted at `dir`. Nothing is touched on disk until the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The registered holder identity, if `init` has run on this machine.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Io`] on read failure and
    /// [`KeyStoreError::CorruptIdentity`] if the file is not valid JSON.
    pub fn user_id(&self) -> Result<Option<String>, KeyStoreError> {
        let path = self.dir.join(IDENTITY_FILE);
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        let identity: Identity =
            serde_json::from_str(&raw).map_err(|_| KeyStoreError::CorruptIdentity(path))?;
        Ok(Some(identity.user_id))
    }

    /// Persist the holder identity.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Io`] if the directory or file cannot be written.
    pub fn save_user_id(&self, user_id: &str) -> Result<(), KeyStoreError> {
        let identity = Identity {
            user_id: user_id.to_owned(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        // Serialising a struct of a string and an integer cannot fail.
        let body = serde_json::to_string(&identity).unwrap_or_default();
        self.write_private(IDENTITY_FILE, body.as_bytes())
    }

    /// Persist the private key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Io`] if the directory or file cannot be written.
    pub fn save_private_key(&self, pem: &PrivateKeyPem) -> Result<(), KeyStoreError> {
        self.write_private(PRIVATE_KEY_FILE, pem.as_str().as_bytes())
    }

    /// Load the private key, if one is on file.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Io`] on read failure.
    pub fn private_key(&self) -> Result<Option<PrivateKeyPem>, KeyStoreError> {
        let path = self.dir.join(PRIVATE_KEY_FILE);
        Ok(read_optional(&path)?.map(|pem| PrivateKeyPem(Zeroizing::new(pem))))
    }

    fn ensure_dir(&self) -> Result<(), KeyStoreError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir).map_err(|source| KeyStoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    fn write_private(&self, name: &str, contents: &[u8]) -> Result<(), KeyStoreError> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let io_err = |source| KeyStoreError::Io {
            path: path.clone(),
            source,
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&path).map_err(io_err)?;
        file.write_all(contents).map_err(io_err)?;
        file.sync_all().map_err(io_err)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, KeyStoreError> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(KeyStoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
