//! Upload targets issued by the negotiation backend.
//!
//! The backend is authoritative about the upload path: the shape of the
//! `initiate-upload` response decides between a single presigned PUT and a
//! multipart upload. The client never branches on file size itself.

use serde::{Deserialize, Serialize};

use crate::types::StorageKey;

/// Where the bytes of one upload attempt go.
///
/// Issued once by the backend's `initiate-upload` endpoint and immutable for
/// the lifetime of the attempt. The two variants correspond to the two
/// response shapes the backend can return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadTarget {
    /// One presigned URL for the whole object.
    SinglePart(SinglePartTarget),
    /// A server-initiated multipart upload with one presigned URL per part.
    Multipart(MultipartTarget),
}

impl UploadTarget {
    /// The storage key this target writes to, regardless of shape.
    #[must_use]
    pub fn storage_key(&self) -> &StorageKey {
        match self {
            Self::SinglePart(t) => &t.storage_key,
            Self::Multipart(t) => &t.storage_key,
        }
    }
}

/// Target for a whole-object PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinglePartTarget {
    /// Presigned URL accepting the full object body.
    pub upload_url: String,
    /// The storage key the object will live under.
    pub storage_key: StorageKey,
}

/// Target for a multipart upload.
///
/// `chunk_size_bytes` and `total_parts` are authoritative values chosen by
/// the backend when it initiated the multipart upload; the client derives
/// byte ranges from them but never invents its own chunk size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartTarget {
    /// Server-side multipart upload identifier.
    pub upload_id: String,
    /// The storage key the assembled object will live under.
    pub storage_key: StorageKey,
    /// Presigned URLs, one per part, index 0 holding part number 1.
    pub part_urls: Vec<String>,
    /// Size of every part except possibly the last.
    pub chunk_size_bytes: u64,
    /// Number of parts the backend expects.
    pub total_parts: u32,
}
