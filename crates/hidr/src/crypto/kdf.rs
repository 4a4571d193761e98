//! Password-based key derivation (PBKDF2-HMAC-SHA512).

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

/// Iteration count for persisted at-rest files.
pub const FILE_ITERATIONS: u32 = 100_000;

/// Iteration count for short-lived password-encrypted strings.
pub const STRING_ITERATIONS: u32 = 50_000;

/// Byte length of a derived key (AES-256).
pub const DERIVED_KEY_LEN: usize = 32;

/// Derive `output_len` bytes from `password` and `salt`.
///
/// Deterministic: the same inputs always produce the same key, which both
/// decryption and the reproducible integrity tag rely on.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; output_len]);
    pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
    out
}

/// Derive a 32-byte file key with the at-rest iteration count.
pub fn derive_file_key(password: &[u8], salt: &[u8]) -> Zeroizing<Vec<u8>> {
    derive(password, salt, FILE_ITERATIONS, DERIVED_KEY_LEN)
}

/// Derive a 32-byte key with the in-memory string iteration count.
pub fn derive_string_key(password: &[u8], salt: &[u8]) -> Zeroizing<Vec<u8>> {
    derive(password, salt, STRING_ITERATIONS, DERIVED_KEY_LEN)
}
