//! Password-encrypted env files.
//!
//! Names stay in plaintext, values are encrypted, and the file carries its own
//! salt and integrity tag under two reserved names. See [`codec`] for the
//! construction and [`password`] for where the password comes from.

pub mod codec;
pub mod convert;
pub mod format;
pub mod password;

pub use codec::{decrypt_env, encrypt_env};
pub use format::EnvVars;
pub use password::resolve_password;

use std::path::{Path, PathBuf};

use hidr_common::HidrError;
use thiserror::Error;
use tracing::{debug, info};

use crate::crypto::CipherError;

/// Reserved name holding the hex whole-file tag.
pub const AUTHENTICATION_KEY: &str = "SENV_AUTHENTICATION";

/// Reserved name holding the hex KDF salt.
pub const SALT_KEY: &str = "SENV_SALT";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("no password provided")]
    NoPassword,

    #[error("incorrect password provided")]
    IncorrectPassword,

    #[error("not an encrypted env file: {0} is missing")]
    MissingField(&'static str),

    #[error("malformed value for {0}")]
    InvalidField(String),

    #[error("{0} is reserved and cannot be encrypted")]
    ReservedName(&'static str),

    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("invalid JSON input: {0}")]
    InvalidJson(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Cipher(#[from] CipherError),
}

impl From<EnvFileError> for HidrError {
    fn from(e: EnvFileError) -> Self {
        match e {
            EnvFileError::NoPassword => HidrError::NoPassword,
            EnvFileError::IncorrectPassword => HidrError::IncorrectPassword,
            EnvFileError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                HidrError::Input(format!("{}: {source}", path.display()))
            }
            EnvFileError::Io { source, .. } => HidrError::Io(source),
            EnvFileError::Cipher(e) => HidrError::Internal(e.to_string()),
            other => HidrError::Input(other.to_string()),
        }
    }
}

/// Encrypt the env file at `input` and return the encrypted text.
///
/// If `previous` names an existing encrypted file, its salt is reused so that
/// re-encrypting unchanged content under the same password reproduces it
/// byte for byte.
///
/// # Errors
///
/// Returns [`EnvFileError::NoPassword`] if no password resolves, and I/O or
/// format errors for unreadable input.
pub fn encrypt_file(
    input: &Path,
    password: Option<&str>,
    previous: Option<&Path>,
) -> Result<String, EnvFileError> {
    let password = resolve_password(input, password)?;
    let vars = format::parse(&read(input)?);

    let encrypted = match previous.and_then(previous_salt) {
        Some(salt) => {
            debug!(file = %input.display(), "reusing salt of existing output");
            codec::encrypt_env_with_salt(&vars, &password, &salt)?
        }
        None => codec::encrypt_env(&vars, &password)?,
    };
    info!(file = %input.display(), variables = vars.len(), "env file encrypted");
    Ok(format::stringify(&encrypted))
}

/// Decrypt the env file at `input` and return the plaintext text.
///
/// # Errors
///
/// Returns [`EnvFileError::IncorrectPassword`] on tag mismatch, and
/// [`EnvFileError::NoPassword`] if no password resolves.
pub fn decrypt_file(input: &Path, password: Option<&str>) -> Result<String, EnvFileError> {
    let password = resolve_password(input, password)?;
    let encrypted = format::parse(&read(input)?);
    let plain = codec::decrypt_env(&encrypted, &password)?;
    info!(file = %input.display(), variables = plain.len(), "env file decrypted");
    Ok(format::stringify(&plain))
}

pub(crate) fn read(path: &Path) -> Result<String, EnvFileError> {
    std::fs::read_to_string(path).map_err(|source| EnvFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn previous_salt(path: &Path) -> Option<Vec<u8>> {
    let text = std::fs::read_to_string(path).ok()?;
    let salt = hex::decode(format::parse(&text).get(SALT_KEY)?).ok()?;
    (salt.len() == codec::SALT_LEN).then_some(salt)
}
