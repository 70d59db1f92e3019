//! Auth gate for short-link mutations.
//!
//! Extracts a bearer token from a request's Authorization header, drives a
//! fresh JWKS fetch and the verifier, and yields either a validated claim
//! set or an HTTP-shaped 401. Invoked by the mutation handlers after the
//! store-configured check, not installed as router middleware: GET on the
//! same paths is public.

use crate::auth::claims::Claims;
use crate::auth::jwks::JwksFetcher;
use crate::auth::jwt;
use crate::errors::EdgeError;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::instrument;

/// Handler-invoked authentication gate.
pub struct AuthGate {
    fetcher: JwksFetcher,
    issuer: String,
    audience: String,
}

impl AuthGate {
    /// Create a new gate with the configured JWKS endpoint and claim
    /// expectations.
    pub fn new(fetcher: JwksFetcher, issuer: String, audience: String) -> Self {
        Self {
            fetcher,
            issuer,
            audience,
        }
    }

    /// Authenticate a request from its headers.
    ///
    /// Every failure (missing or malformed header, unreachable JWKS,
    /// any verification failure) collapses to `EdgeError::InvalidToken`
    /// (401). The distinct causes are logged.
    #[instrument(skip_all, name = "waypost.auth.gate")]
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, EdgeError> {
        let auth_header = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!(target: "waypost.auth.gate", "Missing Authorization header");
                EdgeError::InvalidToken("Missing Authorization header".to_string())
            })?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            tracing::debug!(target: "waypost.auth.gate", "Invalid Authorization header format");
            EdgeError::InvalidToken("Invalid Authorization header format".to_string())
        })?;

        let keys = self.fetcher.fetch().await.map_err(|e| {
            tracing::warn!(target: "waypost.auth.gate", error = ?e, "JWKS fetch failed");
            EdgeError::InvalidToken(e.to_string())
        })?;

        jwt::verify(token, &keys, &self.issuer, &self.audience).map_err(|e| {
            tracing::debug!(target: "waypost.auth.gate", error = ?e, "Token rejected");
            EdgeError::InvalidToken(e.to_string())
        })
    }
}

/// Parse the exact `Bearer <token>` shape: a single space-delimited
/// two-token header. Wrong scheme, extra segments, or an empty token all
/// fail.
fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
