//! Bearer-token authentication for short-link mutations.
//!
//! Three layers, outermost first: the [`gate::AuthGate`] extracts a bearer
//! token from the Authorization header, [`jwks::JwksFetcher`] retrieves the
//! current signing-key set, and [`jwt`] verifies the token against it.

pub mod claims;
pub mod gate;
pub mod jwks;
pub mod jwt;

pub use claims::Claims;
pub use gate::AuthGate;
pub use jwks::{Jwk, JwkSet, JwksFetcher};
pub use jwt::AuthError;
