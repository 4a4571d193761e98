//! Request and response bodies exchanged with the storage service.
//!
//! The service holds ciphertext, read counters and TTLs. Field names follow
//! its JSON API, which is camelCase.

use serde::{Deserialize, Serialize};

/// Header carrying the base64 signature on `PUT /reads/{id}`.
pub const SIGNATURE_HEADER: &str = "X-Hidr-Signature";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Request body for `POST /init`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    /// Holder identity chosen by the user.
    pub user_id: String,
    /// SPKI PEM public key.
    pub public_key: String,
}

/// Response body for `GET /users/{uid}/key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Request body for `POST /store`.
///
/// `uid` and `encrypted` are present together for bound shares and absent for
/// open shares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreRequest {
    /// Random id (16 hex chars).
    pub id: String,
    /// AEAD ciphertext, hex.
    pub content: String,
    /// AEAD nonce, hex.
    pub iv: String,
    /// AEAD tag, hex.
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reads: Option<u32>,
    /// Time-to-live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Recipient identity for bound shares.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// RSA-wrapped symmetric key, hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<String>,
}

/// Response body for `GET /retrieve/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
    pub content: String,
    pub iv: String,
    pub tag: String,
    /// Wrapped key; set only for bound shares.
    #[serde(default)]
    pub encrypted: Option<String>,
    /// `None` when the secret has no read quota.
    #[serde(default)]
    pub remaining_reads: Option<u64>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error body returned by the service on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
