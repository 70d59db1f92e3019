//! HTTP request handlers.
//!
//! `read` serves the public GET surface (short-link redirect with blob
//! fallback); `links` serves the authenticated POST/PUT/DELETE mutations.

use axum::http::Uri;

pub mod links;
pub mod read;

/// Derive the store key from the raw request path: the leading separator
/// stripped, nothing decoded or normalized beyond that. Percent-encoded
/// octets stay literal, so `a%2Fb` and `a/b` are distinct keys.
pub(crate) fn path_key(uri: &Uri) -> &str {
    let path = uri.path();
    path.strip_prefix('/').unwrap_or(path)
}
