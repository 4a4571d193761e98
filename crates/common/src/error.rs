//! User-facing error taxonomy.

use thiserror::Error;

/// Top-level error type returned to the command-dispatch layer.
///
/// Variants map to process exit codes returned to callers:
/// - [`HidrError::Input`] → 2
/// - [`HidrError::PermissionDenied`], [`HidrError::IncorrectPassword`],
///   [`HidrError::NoPassword`] → 3
/// - [`HidrError::Integrity`] → 4
/// - [`HidrError::Transport`] → 5
/// - [`HidrError::Io`], [`HidrError::Internal`] → 1
#[derive(Debug, Error)]
pub enum HidrError {
    /// Malformed identifier, missing secret, TTL below minimum, unsupported
    /// file extension. Raised before any network call.
    #[error("invalid input: {0}")]
    Input(String),

    /// The local holder cannot unwrap the secret's key (no key on file, or the
    /// wrong one). Deliberately does not say which.
    #[error("you do not have permission to view this secret")]
    PermissionDenied,

    /// The at-rest integrity tag did not match after decryption.
    #[error("incorrect password provided")]
    IncorrectPassword,

    /// No password could be resolved from any source.
    #[error("no password provided")]
    NoPassword,

    /// AEAD tag verification failed; no plaintext was released.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// The storage service was unreachable or answered with a non-2xx status.
    #[error("storage service error: {0}")]
    Transport(String),

    /// Local file-system failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HidrError {
    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            HidrError::Input(_) => 2,
            HidrError::PermissionDenied | HidrError::IncorrectPassword | HidrError::NoPassword => 3,
            HidrError::Integrity(_) => 4,
            HidrError::Transport(_) => 5,
            HidrError::Io(_) | HidrError::Internal(_) => 1,
        }
    }
}
