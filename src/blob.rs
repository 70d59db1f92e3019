//! Blob store access.
//!
//! The read path falls back to an external content-addressable blob store
//! when no short link matches. The store is reached through [`BlobStore`]
//! so tests can front it with a mock HTTP origin; [`HttpBlobStore`] is the
//! production implementation, streaming bodies straight through without
//! buffering.

use crate::errors::EdgeError;
use async_trait::async_trait;
use axum::body::Body;
use std::time::Duration;
use tracing::instrument;

/// A blob fetched from the store: body stream plus the metadata bundle the
/// response forwards to the client.
pub struct BlobObject {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub etag: Option<String>,
    pub body: Body,
}

/// Read-only blob retrieval by key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the object stored at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<BlobObject>, EdgeError>;
}

/// Blob store fronted by an HTTP origin (`GET <base>/<key>`).
pub struct HttpBlobStore {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBlobStore {
    pub fn new(base_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "waypost.blob", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<BlobObject>, EdgeError> {
        let response = self
            .http_client
            .get(self.object_url(key))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "waypost.blob", error = %e, "Blob store request failed");
                EdgeError::Store(format!("blob store request failed: {e}"))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            tracing::error!(
                target: "waypost.blob",
                status = %response.status(),
                "Blob store returned error"
            );
            return Err(EdgeError::Store(format!(
                "blob store returned {}",
                response.status()
            )));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        Ok(Some(BlobObject {
            content_type: header("content-type"),
            cache_control: header("cache-control"),
            etag: header("etag"),
            body: Body::from_stream(response.bytes_stream()),
        }))
    }
}
