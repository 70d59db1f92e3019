//! Link store adapter.
//!
//! Wraps the key-value store with the short-link record schema: four
//! existence-checked operations, provenance stamping from the validated
//! claim subject, and deliberate leniency on the read path: a stored value
//! that does not parse is treated as absent so storage corruption degrades
//! to blob fallback instead of failing the request.

use crate::errors::EdgeError;
use crate::models::ShortLinkRecord;
use crate::store::{KvStore, StoreError};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::instrument;

impl From<StoreError> for EdgeError {
    fn from(err: StoreError) -> Self {
        EdgeError::Store(err.to_string())
    }
}

/// Short-link CRUD over a [`KvStore`].
#[derive(Clone)]
pub struct LinkStore {
    kv: Arc<dyn KvStore>,
}

impl LinkStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Read the record at `key`.
    ///
    /// An unparseable stored value is logged and reported as absent.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn lookup(&self, key: &str) -> Result<Option<ShortLinkRecord>, EdgeError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(
                    target: "waypost.store.links",
                    key = %key,
                    error = %e,
                    "Stored short-link value is unparseable, treating as absent"
                );
                Ok(None)
            }
        }
    }

    /// Create a new record. Fails with `Conflict` if the key is in use.
    ///
    /// Uses the store's conditional write, so two racing creates cannot
    /// both succeed.
    #[instrument(skip(self, url, subject), fields(key = %key))]
    pub async fn create(
        &self,
        key: &str,
        url: &str,
        subject: &str,
    ) -> Result<ShortLinkRecord, EdgeError> {
        let record = ShortLinkRecord {
            url: url.to_string(),
            created: Some(timestamp()),
            created_by: Some(subject.to_string()),
            updated: None,
            updated_by: None,
        };
        let raw = encode(&record)?;

        if !self.kv.put_if_absent(key, &raw).await? {
            return Err(EdgeError::Conflict(format!("Key already exists: {key}")));
        }

        tracing::info!(target: "waypost.store.links", key = %key, "Short link created");
        Ok(record)
    }

    /// Replace the target of an existing record. Fails with `NotFound` if
    /// the key is absent.
    ///
    /// Field-preserving merge: the original `created`/`createdBy` survive;
    /// `updated`/`updatedBy` are (re)stamped. The read-then-write is not
    /// atomic; concurrent replaces are last-writer-wins.
    #[instrument(skip(self, url, subject), fields(key = %key))]
    pub async fn replace(
        &self,
        key: &str,
        url: &str,
        subject: &str,
    ) -> Result<ShortLinkRecord, EdgeError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Err(EdgeError::NotFound(format!("Key not found: {key}")));
        };

        // An unparseable prior value loses its provenance but stays
        // replaceable; the key clearly exists.
        let prior: Option<ShortLinkRecord> = serde_json::from_str(&raw).ok();
        if prior.is_none() {
            tracing::warn!(
                target: "waypost.store.links",
                key = %key,
                "Replacing unparseable stored value"
            );
        }

        let record = ShortLinkRecord {
            url: url.to_string(),
            created: prior.as_ref().and_then(|r| r.created.clone()),
            created_by: prior.as_ref().and_then(|r| r.created_by.clone()),
            updated: Some(timestamp()),
            updated_by: Some(subject.to_string()),
        };

        self.kv.put(key, &encode(&record)?).await?;

        tracing::info!(target: "waypost.store.links", key = %key, "Short link replaced");
        Ok(record)
    }

    /// Delete the record at `key`. Fails with `NotFound` if absent.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove(&self, key: &str) -> Result<(), EdgeError> {
        if !self.kv.delete(key).await? {
            return Err(EdgeError::NotFound(format!("Key not found: {key}")));
        }

        tracing::info!(target: "waypost.store.links", key = %key, "Short link removed");
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn encode(record: &ShortLinkRecord) -> Result<String, EdgeError> {
    serde_json::to_string(record).map_err(|e| {
        tracing::error!(target: "waypost.store.links", error = %e, "Record serialization failed");
        EdgeError::Internal
    })
}
