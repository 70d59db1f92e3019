//! Waypost Library
//!
//! Waypost is a small HTTP edge service with two capabilities:
//!
//! - Public read-only retrieval of blob-store objects by key
//! - An authenticated short-link facility: short keys mapping to redirect
//!   targets, stored in a key-value store
//!
//! Mutations require an RSA-signed JWT validated against a remotely fetched
//! JWKS. On GET, a short-link hit short-circuits to a redirect; a miss
//! falls through to the blob store.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> auth/* + store/* + blob.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `auth` - Bearer extraction, JWKS fetch, JWT verification
//! - `store` - Key-value bindings and the short-link adapter
//! - `blob` - Blob-store fallback for the read path
//! - `handlers` - HTTP request handlers
//! - `routes` - Axum router setup

pub mod auth;
pub mod blob;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
