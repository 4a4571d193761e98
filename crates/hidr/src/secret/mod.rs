//! Secret-sharing protocol.
//!
//! # Lifecycle
//!
//! 1. [`SecretService::share`] seals text under a fresh 16-byte key and
//!    12-byte nonce, optionally wraps the key for one recipient, stores the
//!    envelope and returns a [`CompactIdentifier`] token.
//! 2. [`SecretService::view`] decodes the token, retrieves the envelope,
//!    opens it and, for bound shares with a read quota, authorizes the read
//!    decrement with a signature over the random id.
//!
//! Expiry and read exhaustion are enforced by the storage service.

pub mod envelope;
pub mod identifier;
pub mod service;
pub mod ttl;

pub use envelope::{Envelope, EnvelopeError, EnvelopeKey, Recipient};
pub use identifier::{CompactIdentifier, IdentifierError};
pub use service::{read_secret_file, ReadQuota, SecretService, ShareRequest, ViewOutcome};
pub use ttl::{parse_ttl, TtlError};

use hidr_common::HidrError;

use crate::crypto::{CipherError, KeyPairError};

impl From<IdentifierError> for HidrError {
    fn from(e: IdentifierError) -> Self {
        HidrError::Input(format!("malformed identifier: {e}"))
    }
}

impl From<TtlError> for HidrError {
    fn from(e: TtlError) -> Self {
        HidrError::Input(e.to_string())
    }
}

impl From<CipherError> for HidrError {
    fn from(e: CipherError) -> Self {
        HidrError::Integrity(e.to_string())
    }
}

impl From<KeyPairError> for HidrError {
    fn from(e: KeyPairError) -> Self {
        match e {
            // Wrong key and no usable key look the same to the caller.
            KeyPairError::CannotUnwrap
            | KeyPairError::InvalidKey(_)
            | KeyPairError::InvalidSignature => HidrError::PermissionDenied,
            KeyPairError::Generation(msg) => HidrError::Internal(msg),
            KeyPairError::WrapFailed => HidrError::Internal(e.to_string()),
        }
    }
}

impl From<EnvelopeError> for HidrError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::MissingPrivateKey => HidrError::PermissionDenied,
            EnvelopeError::Cipher(e) => e.into(),
            EnvelopeError::KeyPair(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(matches!(
            HidrError::from(IdentifierError::Empty),
            HidrError::Input(_)
        ));
        assert!(matches!(HidrError::from(TtlError::TooShort), HidrError::Input(_)));
        assert!(matches!(
            HidrError::from(EnvelopeError::MissingPrivateKey),
            HidrError::PermissionDenied
        ));
        assert!(matches!(
            HidrError::from(EnvelopeError::KeyPair(KeyPairError::CannotUnwrap)),
            HidrError::PermissionDenied
        ));
        assert!(matches!(
            HidrError::from(EnvelopeError::Cipher(CipherError::AeadFailure)),
            HidrError::Integrity(_)
        ));
    }
}
