//! Waypost configuration.
//!
//! Configuration is loaded from environment variables once at startup and
//! passed into components as an immutable value. The key-value store URL is
//! redacted in Debug output since it may carry credentials.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default target for `GET /` (the empty-key redirect).
pub const DEFAULT_DOCS_URL: &str = "https://github.com/waypost/waypost";

/// Waypost configuration.
///
/// `JWKS_URL`, `JWT_ISSUER`, `JWT_AUDIENCE`, and `BLOB_STORE_URL` are
/// required. `REDIS_URL` is optional: without it the short-link endpoints
/// degrade to 503 while public blob reads keep working.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Redirect target for `GET /`.
    pub docs_url: String,

    /// URL of the JWKS endpoint used to verify bearer tokens.
    pub jwks_url: String,

    /// Expected token issuer, compared by exact string equality.
    pub jwt_issuer: String,

    /// Expected token audience, compared by exact string equality.
    pub jwt_audience: String,

    /// Base URL of the HTTP-fronted blob store.
    pub blob_store_url: String,

    /// Key-value store URL. `None` leaves the short-link store unbound.
    pub redis_url: Option<String>,
}

/// Custom Debug implementation that redacts the store URL.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("docs_url", &self.docs_url)
            .field("jwks_url", &self.jwks_url)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("blob_store_url", &self.blob_store_url)
            .field(
                "redis_url",
                &self.redis_url.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let jwks_url = require(vars, "JWKS_URL")?;
        let jwt_issuer = require(vars, "JWT_ISSUER")?;
        let jwt_audience = require(vars, "JWT_AUDIENCE")?;
        let blob_store_url = require(vars, "BLOB_STORE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let docs_url = vars
            .get("DOCS_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DOCS_URL.to_string());

        let redis_url = vars.get("REDIS_URL").cloned();

        Ok(Config {
            bind_address,
            docs_url,
            jwks_url,
            jwt_issuer,
            jwt_audience,
            blob_store_url,
            redis_url,
        })
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
