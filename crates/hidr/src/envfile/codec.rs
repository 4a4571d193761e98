//! At-rest codec: encrypt the values of an env file, keep the names.
//!
//! ```text
//! key      = PBKDF2-SHA512(password, salt[16], 100 000) → 32 bytes
//! tag      = HMAC-SHA256(key, canonical_json(plaintext vars))
//! base_iv  = tag[..16]
//! iv(name) = HMAC-SHA256(name, base_iv)[..16]
//! value'   = hex(AES-256-CTR(key, iv(name), value))
//! ```
//!
//! The output carries `SENV_AUTHENTICATION = hex(tag)` and
//! `SENV_SALT = hex(salt)` after the encrypted variables. Decryption recomputes
//! the tag over the recovered plaintext; a mismatch means the password is
//! wrong (or the file was edited), as CTR alone cannot tell.
//!
//! Nonces are deterministic so the same (password, salt, file) always yields
//! the same output. Two different files encrypted under the same password and
//! salt derive independent nonces only as long as their tags differ.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use zeroize::Zeroizing;

use crate::crypto::{
    cipher::{self, IV_LEN},
    kdf, mac,
};

use super::format::EnvVars;
use super::{EnvFileError, AUTHENTICATION_KEY, SALT_KEY};

/// Byte length of the random file salt.
pub const SALT_LEN: usize = 16;

/// Encrypt `vars` under `password` with a fresh random salt.
///
/// # Errors
///
/// Returns [`EnvFileError::ReservedName`] if `vars` already contains one of
/// the reserved names.
pub fn encrypt_env(vars: &EnvVars, password: &str) -> Result<EnvVars, EnvFileError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    encrypt_env_with_salt(vars, password, &salt)
}

/// Encrypt `vars` under `password` and an explicit `salt`.
///
/// Output is a pure function of the inputs.
///
/// # Errors
///
/// As [`encrypt_env`].
pub fn encrypt_env_with_salt(
    vars: &EnvVars,
    password: &str,
    salt: &[u8],
) -> Result<EnvVars, EnvFileError> {
    for reserved in [AUTHENTICATION_KEY, SALT_KEY] {
        if vars.get(reserved).is_some() {
            return Err(EnvFileError::ReservedName(reserved));
        }
    }

    let key = kdf::derive_file_key(password.as_bytes(), salt);
    let tag = mac::hmac_sha256(&key, vars.to_canonical_json().as_bytes());
    let base_iv = &tag[..IV_LEN];

    let mut out = EnvVars::new();
    for (name, value) in vars.iter() {
        let iv = variable_nonce(base_iv, name);
        out.insert(name, cipher::stream_encrypt(value, &key, &iv)?);
    }
    out.insert(AUTHENTICATION_KEY, hex::encode(tag));
    out.insert(SALT_KEY, hex::encode(salt));
    Ok(out)
}

/// Decrypt a mapping produced by [`encrypt_env`].
///
/// # Errors
///
/// - [`EnvFileError::MissingField`] / [`EnvFileError::InvalidField`] if the
///   reserved fields or any value are absent or not hex.
/// - [`EnvFileError::IncorrectPassword`] if the recomputed tag differs.
pub fn decrypt_env(encrypted: &EnvVars, password: &str) -> Result<EnvVars, EnvFileError> {
    let mut vars = encrypted.clone();
    let salt_hex = vars
        .remove(SALT_KEY)
        .ok_or(EnvFileError::MissingField(SALT_KEY))?;
    let tag_hex = vars
        .remove(AUTHENTICATION_KEY)
        .ok_or(EnvFileError::MissingField(AUTHENTICATION_KEY))?;

    let salt = hex::decode(&salt_hex).map_err(|_| EnvFileError::InvalidField(SALT_KEY.into()))?;
    let tag = hex::decode(&tag_hex)
        .ok()
        .filter(|t| t.len() == mac::TAG_LEN)
        .ok_or_else(|| EnvFileError::InvalidField(AUTHENTICATION_KEY.into()))?;
    let base_iv = &tag[..IV_LEN];

    let key = kdf::derive_file_key(password.as_bytes(), &salt);

    let mut plain = EnvVars::new();
    for (name, value) in vars.iter() {
        let iv = variable_nonce(base_iv, name);
        let decrypted = cipher::stream_decrypt(value, &key, &iv)
            .map_err(|_| EnvFileError::InvalidField(name.to_owned()))?;
        plain.insert(name, decrypted);
    }

    if !mac::verify_hmac_sha256(&key, plain.to_canonical_json().as_bytes(), &tag) {
        return Err(EnvFileError::IncorrectPassword);
    }
    Ok(plain)
}

/// Encrypt one string under a password, using `iv` as both the KDF salt and
/// the stream IV. With `name`, the IV is first bound to that variable name.
///
/// # Errors
///
/// Returns [`EnvFileError::InvalidField`] if `iv` is not 16 bytes.
pub fn encrypt_string(
    text: &str,
    password: &str,
    iv: &[u8],
    name: Option<&str>,
) -> Result<String, EnvFileError> {
    let (key, iv) = string_key_and_iv(password, iv, name)?;
    Ok(cipher::stream_encrypt(text, &key, &iv)?)
}

/// Reverse of [`encrypt_string`]. Unauthenticated: a wrong password yields
/// garbage, not an error.
///
/// # Errors
///
/// Returns [`EnvFileError::InvalidField`] if `iv` is not 16 bytes or `text`
/// is not hex.
pub fn decrypt_string(
    text: &str,
    password: &str,
    iv: &[u8],
    name: Option<&str>,
) -> Result<Zeroizing<String>, EnvFileError> {
    let (key, iv) = string_key_and_iv(password, iv, name)?;
    cipher::stream_decrypt(text, &key, &iv)
        .map(Zeroizing::new)
        .map_err(|_| EnvFileError::InvalidField("value".into()))
}

/// Per-variable IV: `HMAC-SHA256(key = name, base_iv)[..16]`.
pub fn variable_nonce(base_iv: &[u8], name: &str) -> [u8; IV_LEN] {
    let mac = mac::hmac_sha256(name.as_bytes(), base_iv);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&mac[..IV_LEN]);
    iv
}

fn string_key_and_iv(
    password: &str,
    iv: &[u8],
    name: Option<&str>,
) -> Result<(Zeroizing<Vec<u8>>, [u8; IV_LEN]), EnvFileError> {
    let base: [u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| EnvFileError::InvalidField("iv".into()))?;
    let key = kdf::derive_string_key(password.as_bytes(), &base);
    let iv = match name {
        Some(name) => variable_nonce(&base, name),
        None => base,
    };
    Ok((key, iv))
}
