//! Compact identifiers: the single token a sharer hands to a viewer.
//!
//! ```text
//! open share:  base64url( key[16] ‖ random_id[8] )   → 24 bytes
//! bound share: base64url( random_id[8] )             →  8 bytes
//! ```
//!
//! Decoding picks the branch from the decoded length alone, never from the
//! content.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::cipher::ENVELOPE_KEY_LEN;

/// Byte length of a random secret id.
pub const RANDOM_ID_LEN: usize = 8;

/// Longest decoded identifier that is treated as a bare id.
const MAX_BARE_ID_LEN: usize = 8;

/// base64url without padding on encode; padding tolerated on decode.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors produced while decoding an identifier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier is not valid base64url")]
    InvalidEncoding,

    #[error("identifier has an unexpected length of {0} bytes")]
    InvalidLength(usize),
}

/// A decoded identifier.
#[derive(Clone, PartialEq, Eq)]
pub enum CompactIdentifier {
    /// The key travels wrapped inside the stored envelope.
    Bound { id: String },
    /// Whoever holds the token holds the key.
    Open { key: Zeroizing<Vec<u8>>, id: String },
}

impl CompactIdentifier {
    /// The random id, as lowercase hex, used to address the storage service.
    pub fn id(&self) -> &str {
        match self {
            CompactIdentifier::Bound { id } | CompactIdentifier::Open { id, .. } => id,
        }
    }

    /// The embedded symmetric key, if any.
    pub fn key(&self) -> Option<&[u8]> {
        match self {
            CompactIdentifier::Bound { .. } => None,
            CompactIdentifier::Open { key, .. } => Some(key.as_slice()),
        }
    }

    /// Encode to the base64url token.
    ///
    /// Both the key and the id are handled as raw bytes; an id that is not
    /// valid hex is encoded as its UTF-8 bytes.
    pub fn encode(&self) -> String {
        let id = hex::decode(self.id()).unwrap_or_else(|_| self.id().as_bytes().to_vec());
        match self {
            CompactIdentifier::Bound { .. } => ENGINE.encode(id),
            CompactIdentifier::Open { key, .. } => {
                let mut raw = Zeroizing::new(Vec::with_capacity(key.len() + id.len()));
                raw.extend_from_slice(key);
                raw.extend_from_slice(&id);
                ENGINE.encode(raw.as_slice())
            }
        }
    }

    /// Decode a token produced by [`CompactIdentifier::encode`].
    ///
    /// # Errors
    ///
    /// - [`IdentifierError::Empty`] for an empty or whitespace-only token.
    /// - [`IdentifierError::InvalidEncoding`] if the token is not base64url.
    /// - [`IdentifierError::InvalidLength`] if the decoded length is neither a
    ///   bare id (1–8 bytes) nor a key plus a non-empty id (17+ bytes).
    pub fn decode(token: &str) -> Result<Self, IdentifierError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentifierError::Empty);
        }
        let raw = Zeroizing::new(
            ENGINE
                .decode(token)
                .map_err(|_| IdentifierError::InvalidEncoding)?,
        );

        match raw.len() {
            0 => Err(IdentifierError::Empty),
            n if n <= MAX_BARE_ID_LEN => Ok(CompactIdentifier::Bound {
                id: hex::encode(raw.as_slice()),
            }),
            n if n > ENVELOPE_KEY_LEN => {
                let (key, id) = raw.split_at(ENVELOPE_KEY_LEN);
                Ok(CompactIdentifier::Open {
                    key: Zeroizing::new(key.to_vec()),
                    id: hex::encode(id),
                })
            }
            n => Err(IdentifierError::InvalidLength(n)),
        }
    }
}

impl std::fmt::Debug for CompactIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompactIdentifier::Bound { id } => f.debug_struct("Bound").field("id", id).finish(),
            CompactIdentifier::Open { id, .. } => f
                .debug_struct("Open")
                .field("key", &"[REDACTED]")
                .field("id", id)
                .finish(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bound_roundtrips(id in proptest::collection::vec(any::<u8>(), 1..=MAX_BARE_ID_LEN)) {
            let ident = CompactIdentifier::Bound { id: hex::encode(&id) };
            prop_assert_eq!(CompactIdentifier::decode(&ident.encode()).unwrap(), ident);
        }

        #[test]
        fn open_roundtrips(
            key in any::<[u8; ENVELOPE_KEY_LEN]>(),
            id in proptest::collection::vec(any::<u8>(), 1..32),
        ) {
            let ident = CompactIdentifier::Open {
                key: Zeroizing::new(key.to_vec()),
                id: hex::encode(&id),
            };
            let decoded = CompactIdentifier::decode(&ident.encode()).unwrap();
            prop_assert_eq!(decoded.key(), Some(&key[..]));
            prop_assert_eq!(decoded, ident);
        }
    }
}
