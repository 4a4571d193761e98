//! The envelope: everything needed to reconstruct a shared secret.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use hidr_common::protocol::{RetrieveResponse, StoreRequest};
use zeroize::Zeroizing;

use crate::crypto::{
    cipher::{self, CipherError, ENVELOPE_KEY_LEN, NONCE_LEN},
    keypair::{self, KeyPairError},
};

use super::identifier::{CompactIdentifier, RANDOM_ID_LEN};

/// How the envelope's symmetric key travels.
#[derive(Clone, PartialEq, Eq)]
pub enum EnvelopeKey {
    /// Raw key; it ends up inside the identifier.
    Raw(Zeroizing<Vec<u8>>),
    /// RSA-wrapped key, hex; it is stored with the ciphertext.
    Wrapped(String),
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeKey::Raw(_) => f.write_str("Raw([REDACTED])"),
            EnvelopeKey::Wrapped(hex) => f.debug_tuple("Wrapped").field(hex).finish(),
        }
    }
}

/// A sealed secret, ready to be sent to the storage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// AEAD ciphertext, hex.
    pub ciphertext: String,
    /// AEAD nonce, hex.
    pub iv: String,
    /// AEAD tag, hex.
    pub auth_tag: String,
    pub key: EnvelopeKey,
    /// Set for bound shares.
    pub recipient_id: Option<String>,
    pub ttl_seconds: Option<u64>,
    pub max_reads: Option<u32>,
}

/// Who may open an envelope.
#[derive(Debug, Clone, Copy)]
pub enum Recipient<'a> {
    /// Anyone holding the identifier.
    Anyone,
    /// Only the holder of the private key matching `public_pem`.
    Bound { uid: &'a str, public_pem: &'a str },
}

impl Envelope {
    /// Encrypt `content` under a fresh random key and nonce.
    ///
    /// For [`Recipient::Bound`] the key is wrapped under the recipient's public
    /// key and never leaves that form.
    ///
    /// # Errors
    ///
    /// Propagates [`KeyPairError`] if the recipient's public key is invalid.
    pub fn seal(content: &str, recipient: Recipient<'_>) -> Result<Self, EnvelopeError> {
        let key = random_bytes(ENVELOPE_KEY_LEN);
        let nonce = random_bytes(NONCE_LEN);
        let sealed = cipher::seal(content, &key, &nonce)?;

        let (key, recipient_id) = match recipient {
            Recipient::Anyone => (EnvelopeKey::Raw(key), None),
            Recipient::Bound { uid, public_pem } => (
                EnvelopeKey::Wrapped(keypair::wrap_key(public_pem, &key)?),
                Some(uid.to_owned()),
            ),
        };

        Ok(Self {
            ciphertext: sealed.ciphertext,
            iv: hex::encode(nonce.as_slice()),
            auth_tag: sealed.tag,
            key,
            recipient_id,
            ttl_seconds: None,
            max_reads: None,
        })
    }

    pub fn with_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_max_reads(mut self, max_reads: Option<u32>) -> Self {
        self.max_reads = max_reads;
        self
    }

    /// Build the `POST /store` body under the random id `id`.
    pub fn to_store_request(&self, id: &str) -> StoreRequest {
        let encrypted = match &self.key {
            EnvelopeKey::Raw(_) => None,
            EnvelopeKey::Wrapped(hex) => Some(hex.clone()),
        };
        StoreRequest {
            id: id.to_owned(),
            content: self.ciphertext.clone(),
            iv: self.iv.clone(),
            tag: self.auth_tag.clone(),
            reads: self.max_reads,
            ttl: self.ttl_seconds,
            uid: self.recipient_id.clone(),
            encrypted,
        }
    }

    /// The identifier a viewer needs for this envelope stored under `id`.
    pub fn identifier(&self, id: &str) -> CompactIdentifier {
        match &self.key {
            EnvelopeKey::Raw(key) => CompactIdentifier::Open {
                key: key.clone(),
                id: id.to_owned(),
            },
            EnvelopeKey::Wrapped(_) => CompactIdentifier::Bound { id: id.to_owned() },
        }
    }

    /// Reassemble an envelope from a retrieval payload and the key carried by
    /// the identifier (open shares only).
    pub fn from_retrieved(payload: &RetrieveResponse, identifier_key: Option<&[u8]>) -> Self {
        let key = match (&payload.encrypted, identifier_key) {
            (Some(wrapped), _) => EnvelopeKey::Wrapped(wrapped.clone()),
            (None, Some(key)) => EnvelopeKey::Raw(Zeroizing::new(key.to_vec())),
            (None, None) => EnvelopeKey::Raw(Zeroizing::new(Vec::new())),
        };
        Self {
            ciphertext: payload.content.clone(),
            iv: payload.iv.clone(),
            auth_tag: payload.tag.clone(),
            key,
            recipient_id: None,
            ttl_seconds: None,
            max_reads: None,
        }
    }

    /// Whether opening requires a private key.
    pub fn is_bound(&self) -> bool {
        matches!(self.key, EnvelopeKey::Wrapped(_))
    }

    /// Decrypt the envelope.
    ///
    /// `private_pem` is required for wrapped keys and ignored otherwise.
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::MissingPrivateKey`] if the key is wrapped and no
    ///   private key was supplied; no cipher operation is attempted.
    /// - [`EnvelopeError::KeyPair`] if the wrapped key cannot be unwrapped.
    /// - [`EnvelopeError::Cipher`] if AEAD verification fails.
    pub fn open(&self, private_pem: Option<&str>) -> Result<Zeroizing<String>, EnvelopeError> {
        let key = match &self.key {
            EnvelopeKey::Raw(key) => key.clone(),
            EnvelopeKey::Wrapped(wrapped) => {
                let pem = private_pem.ok_or(EnvelopeError::MissingPrivateKey)?;
                keypair::unwrap_key(pem, wrapped)?
            }
        };
        let nonce = hex::decode(&self.iv).map_err(|_| CipherError::InvalidHex("iv"))?;
        let plaintext = cipher::open(&self.ciphertext, &self.auth_tag, &key, &nonce)?;
        Ok(Zeroizing::new(plaintext))
    }
}

/// Generate a fresh random secret id (hex).
pub fn random_id() -> String {
    hex::encode(random_bytes(RANDOM_ID_LEN).as_slice())
}

fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Errors produced while sealing or opening an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("no private key available for a bound secret")]
    MissingPrivateKey,

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    KeyPair(#[from] KeyPairError),
}
