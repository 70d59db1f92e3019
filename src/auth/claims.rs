//! JWT claims structure.
//!
//! Decoded payload of a validated token. All fields are optional at the
//! serde layer; the verifier enforces presence where the checks require it.
//! The `sub` field is redacted in Debug output to keep identifiers out of
//! logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject used when a validated token carries no `sub` claim.
pub const UNKNOWN_SUBJECT: &str = "unknown";

/// Claim set of a validated token.
///
/// Produced by the verifier, consumed once to stamp `createdBy`/`updatedBy`
/// on short-link records, then discarded.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, compared against the configured expectation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience, compared against the configured expectation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Subject (user or client identifier) - redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not-before timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl Claims {
    /// The subject to stamp on records, falling back to the sentinel when
    /// the token carries no `sub`.
    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or(UNKNOWN_SUBJECT)
    }
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("exp", &self.exp)
            .field("nbf", &self.nbf)
            .finish()
    }
}
