//! RSA key pairs: key wrapping for bound shares and read-decrement signatures.
//!
//! - Keys are 2048-bit RSA. Public halves travel as SPKI PEM, private halves
//!   are stored as PKCS#8 PEM.
//! - Symmetric keys are wrapped with RSA-OAEP (SHA-1), hex-encoded.
//! - Signatures are RSASSA-PKCS1-v1_5 over SHA-256, base64-encoded.
//!
//! Private key material is held in [`Zeroizing`] buffers and never printed.

use aes_gcm::aead::OsRng;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::{
    pkcs1v15::{Signature, SigningKey, VerifyingKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding},
    signature::{SignatureEncoding, Signer, Verifier},
    Oaep, RsaPrivateKey, RsaPublicKey,
};
use sha1::Sha1;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// RSA modulus size in bits.
pub const MODULUS_BITS: usize = 2048;

/// Errors produced by the key-pair layer.
#[derive(Debug, Error)]
pub enum KeyPairError {
    /// Key generation or PEM encoding failed.
    #[error("key generation failed: {0}")]
    Generation(String),

    /// A PEM document could not be parsed as the expected key type.
    #[error("invalid {0} key")]
    InvalidKey(&'static str),

    /// Wrapping a symmetric key under a public key failed.
    #[error("key wrap failed")]
    WrapFailed,

    /// The wrapped key does not belong to this private key, or is corrupt.
    #[error("cannot unwrap key")]
    CannotUnwrap,

    /// A signature could not be decoded or did not verify.
    #[error("invalid signature")]
    InvalidSignature,
}

/// A freshly generated key pair in interchange encoding.
pub struct KeyPair {
    /// SPKI PEM, safe to publish.
    pub public_pem: String,
    /// PKCS#8 PEM, zeroed on drop.
    pub private_pem: Zeroizing<String>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_pem", &self.public_pem)
            .field("private_pem", &"[REDACTED]")
            .finish()
    }
}

/// Generate a new [`MODULUS_BITS`]-bit key pair.
///
/// # Errors
///
/// Returns [`KeyPairError::Generation`] if the RNG or PEM encoder fails.
pub fn generate() -> Result<KeyPair, KeyPairError> {
    let private = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
        .map_err(|e| KeyPairError::Generation(e.to_string()))?;
    let public_pem = RsaPublicKey::from(&private)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyPairError::Generation(e.to_string()))?;
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyPairError::Generation(e.to_string()))?;

    Ok(KeyPair {
        public_pem,
        private_pem,
    })
}

/// Wrap `key` so that only the holder of the matching private key can recover
/// it. Returns the wrapped key as hex.
///
/// # Errors
///
/// Returns [`KeyPairError::InvalidKey`] if `public_pem` is not an SPKI PEM RSA
/// key, [`KeyPairError::WrapFailed`] if `key` is too long for OAEP.
pub fn wrap_key(public_pem: &str, key: &[u8]) -> Result<String, KeyPairError> {
    let public =
        RsaPublicKey::from_public_key_pem(public_pem).map_err(|_| KeyPairError::InvalidKey("public"))?;
    let wrapped = public
        .encrypt(&mut OsRng, Oaep::new::<Sha1>(), key)
        .map_err(|_| KeyPairError::WrapFailed)?;
    Ok(hex::encode(wrapped))
}

/// Recover a symmetric key wrapped by [`wrap_key`].
///
/// # Errors
///
/// Returns [`KeyPairError::CannotUnwrap`] for a wrong key or corrupted input,
/// and [`KeyPairError::InvalidKey`] if `private_pem` cannot be parsed.
pub fn unwrap_key(private_pem: &str, wrapped_hex: &str) -> Result<Zeroizing<Vec<u8>>, KeyPairError> {
    let private = parse_private(private_pem)?;
    let wrapped = hex::decode(wrapped_hex).map_err(|_| KeyPairError::CannotUnwrap)?;
    private
        .decrypt(Oaep::new::<Sha1>(), &wrapped)
        .map(Zeroizing::new)
        .map_err(|_| KeyPairError::CannotUnwrap)
}

/// Sign `message` with the private key. Returns a base64 signature.
///
/// # Errors
///
/// Returns [`KeyPairError::InvalidKey`] if `private_pem` cannot be parsed.
pub fn sign(private_pem: &str, message: &[u8]) -> Result<String, KeyPairError> {
    let signing_key = SigningKey::<Sha256>::new(parse_private(private_pem)?);
    let signature = signing_key.sign(message);
    Ok(STANDARD.encode(signature.to_bytes()))
}

/// Verify a base64 signature produced by [`sign`].
///
/// # Errors
///
/// Returns [`KeyPairError::InvalidSignature`] if the signature is malformed or
/// does not match, [`KeyPairError::InvalidKey`] if `public_pem` is invalid.
pub fn verify(public_pem: &str, message: &[u8], signature_b64: &str) -> Result<(), KeyPairError> {
    let public =
        RsaPublicKey::from_public_key_pem(public_pem).map_err(|_| KeyPairError::InvalidKey("public"))?;
    let raw = STANDARD
        .decode(signature_b64)
        .map_err(|_| KeyPairError::InvalidSignature)?;
    let signature = Signature::try_from(raw.as_slice()).map_err(|_| KeyPairError::InvalidSignature)?;
    VerifyingKey::<Sha256>::new(public)
        .verify(message, &signature)
        .map_err(|_| KeyPairError::InvalidSignature)
}

fn parse_private(private_pem: &str) -> Result<RsaPrivateKey, KeyPairError> {
    RsaPrivateKey::from_pkcs8_pem(private_pem).map_err(|_| KeyPairError::InvalidKey("private"))
}
