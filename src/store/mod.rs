//! Key-value store bindings.
//!
//! The backing store is reached through the [`KvStore`] trait so the link
//! adapter can run over Redis in production and an in-memory map in tests.
//! `put_if_absent` is the conditional-write primitive that closes the
//! create/create race on stores that support it.

use async_trait::async_trait;
use thiserror::Error;

pub mod links;
pub mod memory;
pub mod redis;

pub use links::LinkStore;
pub use memory::MemoryKvStore;
pub use redis::RedisKvStore;

/// Key-value store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store operation failed: {0}")]
    Operation(String),
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Operation(err.to_string())
        }
    }
}

/// Flat string-keyed store with string values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` at `key`, replacing any existing value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` at `key` only if the key is unused. Returns whether
    /// the write happened.
    async fn put_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;

    /// Delete `key`. Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}
