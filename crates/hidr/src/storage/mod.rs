//! Boundary to the remote storage service.
//!
//! The service holds ciphertext, read counters and TTLs. This crate only
//! consumes it: [`StorageService`] is the seam, [`HttpStorage`] the production
//! implementation. Calls are not retried here; callers decide retry policy.

pub mod client;

pub use client::HttpStorage;

use async_trait::async_trait;
use hidr_common::protocol::{RetrieveResponse, StoreRequest};
use hidr_common::HidrError;
use thiserror::Error;

/// Errors produced while talking to the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The service answered with a non-2xx status.
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    /// The service could not be reached or the response was unreadable.
    #[error("request failed: {0}")]
    Unreachable(String),

    /// The configured base URL is not an absolute URL.
    #[error("invalid storage URL: {0}")]
    InvalidUrl(String),
}

impl From<StorageError> for HidrError {
    fn from(e: StorageError) -> Self {
        match e {
            // Surface the service's own message.
            StorageError::Rejected { message, .. } => HidrError::Transport(message),
            StorageError::Unreachable(msg) => HidrError::Transport(msg),
            StorageError::InvalidUrl(msg) => HidrError::Input(format!("invalid storage URL: {msg}")),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Unreachable(e.to_string())
    }
}

/// Operations the secret protocol needs from the storage service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageService: Send + Sync {
    /// `POST /init`: publish `public_pem` for `user_id`.
    async fn register(&self, user_id: &str, public_pem: &str) -> Result<(), StorageError>;

    /// `GET /users/{uid}/key`: fetch a recipient's public key.
    async fn public_key(&self, uid: &str) -> Result<String, StorageError>;

    /// `POST /store`: persist an envelope.
    async fn store(&self, request: &StoreRequest) -> Result<(), StorageError>;

    /// `GET /retrieve/{id}`: fetch an envelope.
    async fn retrieve(&self, id: &str) -> Result<RetrieveResponse, StorageError>;

    /// `PUT /reads/{id}`: consume one read. `signature` is required by the
    /// service only for bound secrets.
    async fn decrement_reads(&self, id: &str, signature: Option<String>) -> Result<(), StorageError>;
}
