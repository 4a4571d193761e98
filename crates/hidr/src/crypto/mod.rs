//! Cryptographic building blocks shared by both protocols.
//!
//! This module is intentionally free of network and file-system dependencies.
//! The secret-sharing protocol ([`crate::secret`]) and the env-file protocol
//! ([`crate::envfile`]) both compose these pieces and never each other.
//!
//! # Text encoding
//!
//! Every ciphertext, nonce, tag and wrapped key crosses module boundaries as
//! lowercase hex so that envelopes stay fully text-transportable.

pub mod cipher;
pub mod kdf;
pub mod keypair;
pub mod mac;

pub use cipher::CipherError;
pub use keypair::{KeyPair, KeyPairError};
