//! Symmetric encryption profiles.
//!
//! **AEAD profile** (secret envelopes): AES-256-GCM with a 12-byte nonce and a
//! detached 16-byte tag. A 16-byte envelope key is stretched to the 32 bytes
//! AES-256 needs by concatenating it with itself. That construction caps the
//! effective key strength at 128 bits; it is kept because every identifier
//! already in circulation embeds exactly 16 key bytes.
//!
//! **Stream profile** (at-rest values): AES-256-CTR with a 16-byte IV and a
//! 128-bit big-endian counter. No padding and no integrity of its own; the
//! env-file codec authenticates the whole file separately.
//!
//! Both profiles take UTF-8 text in and produce lowercase hex out, and the
//! reverse on decryption.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use ctr::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;
use zeroize::Zeroizing;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of a random envelope key. Doubled to [`KEY_LEN`] for AES-GCM.
pub const ENVELOPE_KEY_LEN: usize = 16;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Byte length of an AES-CTR IV.
pub const IV_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is neither [`ENVELOPE_KEY_LEN`] nor [`KEY_LEN`] bytes.
    #[error("invalid key length: {0} bytes")]
    InvalidKeyLength(usize),

    /// The nonce or IV does not match the profile.
    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// AES-GCM tag verification failed (wrong key or tampered data).
    #[error("authentication tag mismatch")]
    AeadFailure,

    /// A hex field could not be decoded.
    #[error("invalid hex in {0}")]
    InvalidHex(&'static str),

    /// Authenticated plaintext was not UTF-8.
    #[error("decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// Output of [`seal`]: hex ciphertext and its detached tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: String,
    pub tag: String,
}

// ---------------------------------------------------------------------------
// AEAD profile
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with AES-256-GCM.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not 16 or 32 bytes,
/// [`CipherError::InvalidNonceLength`] if `nonce` is not [`NONCE_LEN`] bytes.
pub fn seal(plaintext: &str, key: &[u8], nonce: &[u8]) -> Result<Sealed, CipherError> {
    let cipher = build_gcm(key)?;
    let nonce = gcm_nonce(nonce)?;

    let mut out = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CipherError::AeadFailure)?;
    let tag = out.split_off(out.len() - TAG_LEN);

    Ok(Sealed {
        ciphertext: hex::encode(out),
        tag: hex::encode(tag),
    })
}

/// Verify and decrypt a hex ciphertext produced by [`seal`].
///
/// Fails closed: no plaintext is returned unless the tag verifies.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if authentication fails, plus the
/// length and hex errors of [`seal`].
pub fn open(ciphertext: &str, tag: &str, key: &[u8], nonce: &[u8]) -> Result<String, CipherError> {
    let cipher = build_gcm(key)?;
    let nonce = gcm_nonce(nonce)?;

    let mut buf = hex::decode(ciphertext).map_err(|_| CipherError::InvalidHex("ciphertext"))?;
    let tag = hex::decode(tag).map_err(|_| CipherError::InvalidHex("tag"))?;
    if tag.len() != TAG_LEN {
        return Err(CipherError::AeadFailure);
    }
    buf.extend_from_slice(&tag);

    let plaintext = cipher
        .decrypt(nonce, buf.as_slice())
        .map_err(|_| CipherError::AeadFailure)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
}

fn build_gcm(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    let full: Zeroizing<Vec<u8>> = match key.len() {
        ENVELOPE_KEY_LEN => Zeroizing::new([key, key].concat()),
        KEY_LEN => Zeroizing::new(key.to_vec()),
        other => return Err(CipherError::InvalidKeyLength(other)),
    };
    Aes256Gcm::new_from_slice(&full).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}

fn gcm_nonce(nonce: &[u8]) -> Result<&Nonce<aes_gcm::aead::consts::U12>, CipherError> {
    if nonce.len() != NONCE_LEN {
        return Err(CipherError::InvalidNonceLength {
            expected: NONCE_LEN,
            actual: nonce.len(),
        });
    }
    Ok(Nonce::from_slice(nonce))
}

// ---------------------------------------------------------------------------
// Stream profile
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` with AES-256-CTR. Ciphertext length equals plaintext
/// length.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] unless `key` is [`KEY_LEN`] bytes,
/// [`CipherError::InvalidNonceLength`] unless `iv` is [`IV_LEN`] bytes.
pub fn stream_encrypt(plaintext: &str, key: &[u8], iv: &[u8]) -> Result<String, CipherError> {
    let mut buf = plaintext.as_bytes().to_vec();
    build_ctr(key, iv)?.apply_keystream(&mut buf);
    Ok(hex::encode(buf))
}

/// Decrypt a hex ciphertext produced by [`stream_encrypt`].
///
/// The stream profile has no integrity, so a wrong key yields garbage rather
/// than an error. Invalid UTF-8 is replaced lossily so that callers always
/// reach their own integrity check.
///
/// # Errors
///
/// Returns [`CipherError::InvalidHex`] for malformed input and the same length
/// errors as [`stream_encrypt`].
pub fn stream_decrypt(ciphertext: &str, key: &[u8], iv: &[u8]) -> Result<String, CipherError> {
    let mut cipher = build_ctr(key, iv)?;
    let mut buf =
        Zeroizing::new(hex::decode(ciphertext).map_err(|_| CipherError::InvalidHex("value"))?);
    cipher.apply_keystream(&mut buf);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn build_ctr(key: &[u8], iv: &[u8]) -> Result<Aes256Ctr, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    if iv.len() != IV_LEN {
        return Err(CipherError::InvalidNonceLength {
            expected: IV_LEN,
            actual: iv.len(),
        });
    }
    Aes256Ctr::new_from_slices(key, iv).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn aead_key() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            proptest::collection::vec(any::<u8>(), ENVELOPE_KEY_LEN),
            proptest::collection::vec(any::<u8>(), KEY_LEN),
        ]
    }

    proptest! {
        #[test]
        fn seal_open_roundtrips(
            plaintext in any::<String>(),
            key in aead_key(),
            nonce in any::<[u8; NONCE_LEN]>(),
        ) {
            let sealed = seal(&plaintext, &key, &nonce).unwrap();
            prop_assert_eq!(sealed.tag.len(), TAG_LEN * 2);
            let opened = open(&sealed.ciphertext, &sealed.tag, &key, &nonce).unwrap();
            prop_assert_eq!(opened, plaintext);
        }

        #[test]
        fn stream_roundtrips_and_keeps_length(
            plaintext in any::<String>(),
            key in any::<[u8; KEY_LEN]>(),
            iv in any::<[u8; IV_LEN]>(),
        ) {
            let ct = stream_encrypt(&plaintext, &key, &iv).unwrap();
            prop_assert_eq!(ct.len(), plaintext.len() * 2);
            prop_assert_eq!(stream_decrypt(&ct, &key, &iv).unwrap(), plaintext);
        }
    }
}
