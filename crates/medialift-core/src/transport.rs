//! Transport seam for presigned-URL transfers.
//!
//! One trait method, one HTTP PUT, no retries. A partially-streamed PUT
//! against a presigned URL is not guaranteed idempotent by the object
//! store, so a failed transfer fails the attempt; there is deliberately no
//! retry policy at any layer.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;

use crate::error::TransportError;

/// Cumulative byte-progress observer for one transfer.
///
/// Invoked zero or more times with a monotonically non-decreasing count of
/// bytes handed to the wire, capped at the body length.
pub type ProgressObserver = Arc<dyn Fn(u64) + Send + Sync>;

/// Outcome of a successful PUT.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    /// The `ETag` response header, when the store returned one.
    ///
    /// Mandatory for multipart parts (the scheduler turns its absence into
    /// a hard failure) but not required on the single-PUT path.
    pub etag: Option<String>,
}

/// Uploads one byte buffer to one presigned URL.
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    /// Issue exactly one HTTP PUT with `body` and the given `Content-Type`.
    ///
    /// Implementations stream the body and report cumulative progress
    /// through `observer`. A non-2xx response or connection failure is a
    /// [`TransportError`]; this layer never retries.
    async fn put_bytes(
        &self,
        url: &str,
        body: Bytes,
        content_type: &Mime,
        observer: ProgressObserver,
    ) -> Result<PutOutcome, TransportError>;
}
