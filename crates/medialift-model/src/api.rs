//! Request and response payloads for the negotiation backend.
//!
//! Four endpoints, all JSON POSTs:
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | `initiate-upload` | [`InitiateUploadRequest`] | [`crate::UploadTarget`] |
//! | `complete-multipart` | [`CompleteMultipartRequest`] | empty |
//! | `abort-multipart` | [`AbortMultipartRequest`] | empty |
//! | `confirm-upload` | [`ConfirmUploadRequest`] | [`ConfirmUploadResponse`] |

use serde::{Deserialize, Serialize};

use crate::part::CompletedPart;
use crate::types::{AssetId, StorageKey};

/// Ask the backend for an upload target.
///
/// The backend uses `file_size_bytes` to choose the target shape (single
/// presigned PUT vs multipart); the client does not duplicate that policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateUploadRequest {
    /// The asset's real MIME type.
    pub mime_type: String,
    /// Total size of the asset in bytes.
    pub file_size_bytes: u64,
}

/// Assemble a finished multipart upload server-side.
///
/// `parts` must be sorted ascending by part number; the object store
/// rejects out-of-order part lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMultipartRequest {
    /// The storage key issued at initiation.
    pub storage_key: StorageKey,
    /// The multipart upload identifier issued at initiation.
    pub upload_id: String,
    /// Completion tokens for every part, ascending by part number.
    pub parts: Vec<CompletedPart>,
}

/// Discard server-side multipart state after a failed attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbortMultipartRequest {
    /// The storage key issued at initiation.
    pub storage_key: StorageKey,
    /// The multipart upload identifier issued at initiation.
    pub upload_id: String,
}

/// Confirm the uploaded object with the metadata service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadRequest {
    /// The storage key the object was written under.
    pub storage_key: StorageKey,
    /// Total size of the asset in bytes.
    pub file_size_bytes: u64,
    /// The asset's real MIME type.
    pub mime_type: String,
    /// Caller-supplied metadata, forwarded verbatim.
    pub metadata: serde_json::Value,
}

/// Response of the metadata-confirmation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmUploadResponse {
    /// The durable asset id for the confirmed object.
    pub asset_id: AssetId,
}
