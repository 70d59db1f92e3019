//! Public read path.
//!
//! `GET /` redirects to the documentation URL. `GET /<key>` checks the
//! short-link store first; a hit short-circuits to a 302, a miss (or a
//! degraded store) falls through to the blob store. Neither present → 404.

use crate::errors::EdgeError;
use crate::routes::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::Response;
use std::sync::Arc;
use tracing::instrument;

/// `GET /`: 302 to the fixed documentation URL, regardless of auth state.
#[instrument(skip_all, name = "waypost.read.root")]
pub async fn root_redirect(State(state): State<Arc<AppState>>) -> Result<Response, EdgeError> {
    found(&state.config.docs_url)
}

/// `GET /<key>`: short-link redirect or blob passthrough.
///
/// The key is the raw request path, taken literally; axum's decoding
/// `Path` extractor is deliberately not used here.
#[instrument(skip_all, name = "waypost.read.object", fields(path = %uri.path()))]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, EdgeError> {
    let key = super::path_key(&uri);

    if let Some(links) = &state.links {
        match links.lookup(key).await {
            Ok(Some(record)) => return found(&record.url),
            Ok(None) => {}
            Err(e) => {
                // A degraded link store must not take down public reads.
                tracing::warn!(
                    target: "waypost.read",
                    key = %key,
                    error = %e,
                    "Short-link lookup failed, falling through to blob store"
                );
            }
        }
    }

    match state.blobs.get(key).await? {
        Some(blob) => {
            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(content_type) = &blob.content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            if let Some(cache_control) = &blob.cache_control {
                builder = builder.header(header::CACHE_CONTROL, cache_control);
            }
            if let Some(etag) = &blob.etag {
                builder = builder.header(header::ETAG, etag);
            }
            builder.body(blob.body).map_err(|e| {
                tracing::error!(target: "waypost.read", error = %e, "Failed to build blob response");
                EdgeError::Internal
            })
        }
        None => Err(EdgeError::NotFound(format!("Object Not Found: {key}"))),
    }
}

/// Build a 302 Found with the given Location.
fn found(location: &str) -> Result<Response, EdgeError> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .map_err(|e| {
            tracing::error!(target: "waypost.read", error = %e, "Failed to build redirect");
            EdgeError::Internal
        })
}
