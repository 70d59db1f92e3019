//! HTTP routes for Waypost.
//!
//! Defines the Axum router and application state. The surface supports
//! exactly GET, POST, PUT, and DELETE; everything else, including HEAD,
//! answers 405 with `Allow: GET, POST, PUT, DELETE`.

use crate::auth::AuthGate;
use crate::blob::BlobStore;
use crate::config::Config;
use crate::handlers::{links, read};
use crate::store::LinkStore;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// The exact method set of this surface, as advertised on 405.
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

/// Application state shared across all handlers.
///
/// Everything here is fixed at startup; requests share no mutable state.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Authentication gate for mutations.
    pub auth: AuthGate,

    /// Short-link store, absent when no key-value binding is configured.
    pub links: Option<LinkStore>,

    /// Blob store backing the public read path.
    pub blobs: Arc<dyn BlobStore>,
}

/// Build the application routes.
///
/// - `/`: GET root redirect, POST create, PUT replace, DELETE (400)
/// - `/*key`: GET read with blob fallback, POST/PUT (body-keyed), DELETE
///
/// Layers: TraceLayer for request logging, 30 second request timeout.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(read::root_redirect)
                .post(links::create_link)
                .put(links::update_link)
                .delete(links::delete_root)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/*key",
            get(read::get_object)
                .post(links::create_link)
                .put(links::update_link)
                .delete(links::delete_link)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

/// 405 with the exact supported method set.
///
/// Registered for HEAD and as the method fallback: axum routes HEAD to the
/// GET handler and advertises HEAD in its generated `Allow` header, neither
/// of which matches this surface's method set. axum keeps a response's own
/// `Allow` header when one is already present.
async fn method_not_allowed() -> Response {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::ALLOW, ALLOWED_METHODS)
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::METHOD_NOT_ALLOWED.into_response())
}
