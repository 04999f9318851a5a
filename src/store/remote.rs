//! Best-effort remote tier.
//!
//! The remote side is a plain HTTP key/value service (`GET`/`PUT`/`DELETE
//! {base}/records/{key}`, bearer-authenticated). It is rate- and
//! size-limited, may be unreachable, and is never on the critical path: every
//! failure is classified into a [`RemoteError`] that the dual-tier store
//! recovers from locally.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Largest value accepted by the remote service. Checked client-side before
/// the request is sent; the server answers 413 for anything that slips past.
pub const MAX_REMOTE_PAYLOAD_BYTES: usize = 512 * 1024;

/// Classified remote-tier failure. Never propagated past the store layer.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service's write rate quota is exhausted (HTTP 429).
    #[error("remote write quota exceeded")]
    WriteQuotaExceeded,

    /// The account's storage quota is exhausted (HTTP 507).
    #[error("remote storage quota exceeded")]
    StorageQuotaExceeded,

    /// Credentials rejected (HTTP 401/403).
    #[error("remote permission denied")]
    PermissionDenied,

    /// The value exceeds the payload ceiling (client-side check or HTTP 413).
    #[error("payload of {size} bytes exceeds the {MAX_REMOTE_PAYLOAD_BYTES}-byte remote limit")]
    PayloadTooLarge { size: usize },

    /// Transport failure or any other unexpected response.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::WriteQuotaExceeded,
            StatusCode::INSUFFICIENT_STORAGE => Self::StorageQuotaExceeded,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge { size: 0 },
            other => Self::Unavailable(format!("unexpected HTTP {other}")),
        }
    }
}

/// The remote half of the dual-tier store.
///
/// [`HttpRemote`] is the production implementation; tests substitute a
/// scripted in-memory double to exercise quota and outage paths.
#[async_trait]
pub trait RemoteTier: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>, RemoteError>;
    async fn write(&self, key: &str, value: &str) -> Result<(), RemoteError>;
    async fn remove(&self, key: &str) -> Result<(), RemoteError>;
}

/// HTTP implementation of [`RemoteTier`].
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn record_url(&self, key: &str) -> String {
        format!("{}/records/{key}", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl RemoteTier for HttpRemote {
    async fn read(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let response = self
            .authorize(self.client.get(self.record_url(key)))
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
                Ok(Some(body))
            }
            status => Err(RemoteError::from_status(status)),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), RemoteError> {
        if value.len() > MAX_REMOTE_PAYLOAD_BYTES {
            return Err(RemoteError::PayloadTooLarge { size: value.len() });
        }

        let response = self
            .authorize(self.client.put(self.record_url(key)))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(value.to_string())
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RemoteError::from_status(status))
        }
    }

    async fn remove(&self, key: &str) -> Result<(), RemoteError> {
        let response = self
            .authorize(self.client.delete(self.record_url(key)))
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();
        // A missing key is already removed
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(RemoteError::from_status(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            RemoteError::from_status(StatusCode::TOO_MANY_REQUESTS),
            RemoteError::WriteQuotaExceeded
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::INSUFFICIENT_STORAGE),
            RemoteError::StorageQuotaExceeded
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::UNAUTHORIZED),
            RemoteError::PermissionDenied
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::FORBIDDEN),
            RemoteError::PermissionDenied
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::PAYLOAD_TOO_LARGE),
            RemoteError::PayloadTooLarge { .. }
        ));
        assert!(matches!(
            RemoteError::from_status(StatusCode::BAD_GATEWAY),
            RemoteError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn oversized_write_is_rejected_before_sending() {
        // base_url is never contacted: the client-side ceiling fires first
        let remote = HttpRemote::new("http://localhost:1", None);
        let value = "x".repeat(MAX_REMOTE_PAYLOAD_BYTES + 1);
        let err = remote.write("items", &value).await.unwrap_err();
        assert!(matches!(err, RemoteError::PayloadTooLarge { size } if size > MAX_REMOTE_PAYLOAD_BYTES));
    }
}
