//! JWT verification.
//!
//! Validates compact JWTs (`header.payload.signature`) against a fetched
//! JWKS. Exactly one scheme is supported: RSA PKCS#1 v1.5 with SHA-256
//! (RS256). The algorithm is allowlisted rather than taken from the token,
//! which forecloses algorithm-confusion attacks.
//!
//! Checks run in a fixed order, each a distinct rejection point: structure,
//! header/kid, key lookup, key import, signature, payload, then the
//! `iss`/`aud`/`exp`/`nbf` claims. The distinctions exist for logging and
//! tests; at the HTTP boundary they all collapse to 401.

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwkSet};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Maximum accepted token size in bytes. Oversized tokens are rejected
/// before any parsing (DoS prevention).
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Typed verification failure.
///
/// The Display strings double as the human-readable 401 reason at the
/// boundary; none of them leak key material or claim values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unable to retrieve signing keys")]
    JwksUnavailable,

    #[error("The token is malformed")]
    MalformedToken,

    #[error("No signing key matches the token")]
    KeyNotFound(String),

    #[error("The matched key cannot be used for verification")]
    UnusableKey,

    #[error("The token signature is invalid")]
    InvalidSignature,

    #[error("The token issuer is not recognized")]
    InvalidIssuer,

    #[error("The token audience is not accepted")]
    InvalidAudience,

    #[error("The token has expired")]
    TokenExpired,

    #[error("The token is not yet valid")]
    TokenNotYetValid,
}

/// Decoded JWT header, only the field we route on.
#[derive(Deserialize)]
struct TokenHeader {
    kid: String,
}

/// Extract the `kid` from a compact JWT's header segment.
///
/// Rejects tokens that are oversized, do not have exactly three segments,
/// or whose header is not base64url-encoded JSON with a non-empty string
/// `kid`.
pub fn extract_kid(token: &str) -> Result<String, AuthError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        return Err(AuthError::MalformedToken);
    }

    let mut segments = token.split('.');
    let header_segment = match (segments.next(), segments.next(), segments.next(), segments.next())
    {
        (Some(header), Some(_payload), Some(_signature), None) => header,
        _ => return Err(AuthError::MalformedToken),
    };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|_| AuthError::MalformedToken)?;

    let header: TokenHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;

    if header.kid.is_empty() {
        return Err(AuthError::MalformedToken);
    }

    Ok(header.kid)
}

/// Import a JWK as an RS256 decoding key.
fn import_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        tracing::warn!(target: "waypost.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(AuthError::UnusableKey);
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "waypost.auth.jwt", alg = %alg, "Unexpected JWK algorithm");
            return Err(AuthError::UnusableKey);
        }
    }

    let (n, e) = match (&jwk.n, &jwk.e) {
        (Some(n), Some(e)) => (n, e),
        _ => {
            tracing::error!(target: "waypost.auth.jwt", kid = %jwk.kid, "JWK missing RSA components");
            return Err(AuthError::UnusableKey);
        }
    };

    DecodingKey::from_rsa_components(n, e).map_err(|e| {
        tracing::error!(target: "waypost.auth.jwt", error = %e, "Invalid RSA component encoding");
        AuthError::UnusableKey
    })
}

/// Verify a token against a fetched key set and the configured
/// issuer/audience expectations, returning the decoded claim set.
pub fn verify(
    token: &str,
    keys: &JwkSet,
    issuer: &str,
    audience: &str,
) -> Result<Claims, AuthError> {
    let kid = extract_kid(token)?;

    let jwk = keys
        .get(&kid)
        .ok_or_else(|| AuthError::KeyNotFound(kid.clone()))?;

    let decoding_key = import_key(jwk)?;

    // Signature and structural checks only; claim checks are explicit below
    // so each produces its own typed failure.
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "waypost.auth.jwt", error = %e, "Token verification failed");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken,
        }
    })?;
    let claims = token_data.claims;

    if claims.iss.as_deref() != Some(issuer) {
        return Err(AuthError::InvalidIssuer);
    }

    if claims.aud.as_deref() != Some(audience) {
        return Err(AuthError::InvalidAudience);
    }

    let now = chrono::Utc::now().timestamp();

    if let Some(exp) = claims.exp {
        if exp < now {
            return Err(AuthError::TokenExpired);
        }
    }

    if let Some(nbf) = claims.nbf {
        if nbf > now {
            return Err(AuthError::TokenNotYetValid);
        }
    }

    Ok(claims)
}
