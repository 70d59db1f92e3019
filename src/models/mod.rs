//! Data models: the stored short-link record and the HTTP payload shapes.

use serde::{Deserialize, Serialize};

/// The persisted short-link record, stored as JSON under its key.
///
/// `created`/`createdBy` are stamped on first write and preserved across
/// updates; `updated`/`updatedBy` are stamped on each replace. Timestamps
/// are ISO-8601, set by the service, never supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLinkRecord {
    /// Redirect target. Stored as given; not validated as a URL.
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// JSON body of POST and PUT. Both fields are required; they are optional
/// here so that a missing field is reported as a 400 rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct LinkPayload {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

/// Success payload of POST (201) and PUT (200).
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub success: bool,
    pub key: String,
    pub url: String,
}

/// Success payload of DELETE (200).
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub success: bool,
    pub key: String,
}
