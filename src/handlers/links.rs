//! Authenticated short-link mutations.
//!
//! Every mutation runs the same sequence: 503 if no key-value store is
//! bound, then the auth gate, then body/key validation, then the
//! existence-checked store operation.

use crate::errors::EdgeError;
use crate::models::{LinkPayload, LinkResponse, RemoveResponse};
use crate::routes::AppState;
use crate::store::LinkStore;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;
use tracing::instrument;

/// `POST /`: create a short link. 409 if the key is in use.
#[instrument(skip_all, name = "waypost.links.create")]
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, EdgeError> {
    let links = require_links(&state)?;
    let claims = state.auth.authenticate(&headers).await?;
    let (key, url) = parse_payload(&body)?;

    let record = links.create(&key, &url, claims.subject()).await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(LinkResponse {
            success: true,
            key,
            url: record.url,
        }),
    )
        .into_response())
}

/// `PUT /`: replace an existing short link's target. 404 if absent.
#[instrument(skip_all, name = "waypost.links.update")]
pub async fn update_link(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, EdgeError> {
    let links = require_links(&state)?;
    let claims = state.auth.authenticate(&headers).await?;
    let (key, url) = parse_payload(&body)?;

    let record = links.replace(&key, &url, claims.subject()).await?;

    Ok(axum::Json(LinkResponse {
        success: true,
        key,
        url: record.url,
    })
    .into_response())
}

/// `DELETE /<key>`: remove a short link. 404 if absent.
///
/// Like the read path, the key is the raw request path taken literally.
#[instrument(skip_all, name = "waypost.links.remove", fields(path = %uri.path()))]
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, EdgeError> {
    let links = require_links(&state)?;
    state.auth.authenticate(&headers).await?;

    let key = super::path_key(&uri).to_string();
    links.remove(&key).await?;

    Ok(axum::Json(RemoveResponse { success: true, key }).into_response())
}

/// `DELETE /`: no key to remove. Sequenced after the store and auth
/// checks so an unauthenticated caller still sees 503/401 first.
#[instrument(skip_all, name = "waypost.links.remove_root")]
pub async fn delete_root(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, EdgeError> {
    require_links(&state)?;
    state.auth.authenticate(&headers).await?;

    Err(EdgeError::BadRequest("Missing key in path".to_string()))
}

fn require_links(state: &AppState) -> Result<&LinkStore, EdgeError> {
    state.links.as_ref().ok_or_else(|| {
        EdgeError::ServiceUnavailable("Short-link store is not configured".to_string())
    })
}

/// Parse the JSON body, requiring non-empty `key` and a `url`.
fn parse_payload(body: &Bytes) -> Result<(String, String), EdgeError> {
    let payload: LinkPayload = serde_json::from_slice(body)
        .map_err(|e| EdgeError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let key = payload
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| EdgeError::BadRequest("Missing required field: key".to_string()))?;

    let url = payload
        .url
        .ok_or_else(|| EdgeError::BadRequest("Missing required field: url".to_string()))?;

    Ok((key, url))
}
