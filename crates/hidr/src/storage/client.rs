//! reqwest-backed [`StorageService`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use hidr_common::protocol::{
    ErrorResponse, InitRequest, PublicKeyResponse, RetrieveResponse, StoreRequest,
    SIGNATURE_HEADER,
};
use reqwest::{Client, Response, Url};
use tracing::debug;

use super::{StorageError, StorageService};

/// HTTP client for the storage service JSON API.
#[derive(Clone, Debug)]
pub struct HttpStorage {
    client: Client,
    base_url: Url,
}

impl HttpStorage {
    /// Build a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidUrl`] unless `base_url` is an absolute
    /// http(s) URL, [`StorageError::Unreachable`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StorageError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Append `segments` to the base path, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Turn a non-2xx response into [`StorageError::Rejected`], preferring the
/// service's `{"error": ...}` message over the bare status line.
async fn check(resp: Response) -> Result<Response, StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_owned()
        });
    Err(StorageError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl StorageService for HttpStorage {
    async fn register(&self, user_id: &str, public_pem: &str) -> Result<(), StorageError> {
        let body = InitRequest {
            user_id: user_id.to_owned(),
            public_key: public_pem.to_owned(),
        };
        let resp = self.client.post(self.url(&["init"])).json(&body).send().await?;
        check(resp).await?;
        debug!(user_id, "identity registered");
        Ok(())
    }

    async fn public_key(&self, uid: &str) -> Result<String, StorageError> {
        let resp = self
            .client
            .get(self.url(&["users", uid, "key"]))
            .send()
            .await?;
        let key: PublicKeyResponse = check(resp).await?.json().await?;
        Ok(key.public_key)
    }

    async fn store(&self, request: &StoreRequest) -> Result<(), StorageError> {
        let resp = self.client.post(self.url(&["store"])).json(request).send().await?;
        check(resp).await?;
        debug!(id = %request.id, bound = request.uid.is_some(), "secret stored");
        Ok(())
    }

    async fn retrieve(&self, id: &str) -> Result<RetrieveResponse, StorageError> {
        let resp = self
            .client
            .get(self.url(&["retrieve", id]))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn decrement_reads(&self, id: &str, signature: Option<String>) -> Result<(), StorageError> {
        let mut req = self.client.put(self.url(&["reads", id]));
        if let Some(sig) = signature {
            req = req.header(SIGNATURE_HEADER, sig);
        }
        let resp = req.send().await?;
        check(resp).await?;
        debug!(id, "read count decremented");
        Ok(())
    }
}
