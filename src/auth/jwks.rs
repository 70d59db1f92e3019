//! JWKS fetcher.
//!
//! Retrieves the current signing-key set from the configured JWKS URL. There
//! is no cache: short-link mutations are low-traffic admin operations and
//! every verification fetches a fresh key set, so a rotation upstream is
//! picked up immediately.

use crate::auth::jwt::AuthError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// JSON Web Key from the JWKS endpoint.
///
/// Only RSA descriptors are usable for verification; other key types are
/// carried through deserialization and rejected at import time.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" for the keys this service accepts).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS document shape: `{"keys": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// A fetched key set, indexed by key ID.
#[derive(Debug, Clone)]
pub struct JwkSet {
    keys: HashMap<String, Jwk>,
}

impl JwkSet {
    /// Look up a key by its `kid`.
    pub fn get(&self, kid: &str) -> Option<&Jwk> {
        self.keys.get(kid)
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set carries no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<JwksResponse> for JwkSet {
    fn from(response: JwksResponse) -> Self {
        let keys = response
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();
        JwkSet { keys }
    }
}

/// Fetches the signing-key set from the configured JWKS endpoint.
pub struct JwksFetcher {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,
}

impl JwksFetcher {
    /// Create a new JWKS fetcher.
    pub fn new(jwks_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "waypost.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
        }
    }

    /// Fetch the current key set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksUnavailable` if the HTTP call does not
    /// succeed or the body is not a parseable JWKS document.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(target: "waypost.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "waypost.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::JwksUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "waypost.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::JwksUnavailable);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "waypost.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::JwksUnavailable
        })?;

        let set = JwkSet::from(jwks);
        tracing::debug!(target: "waypost.auth.jwks", key_count = set.len(), "JWKS fetched");

        Ok(set)
    }
}
