//! Error taxonomy for upload attempts.
//!
//! [`UploadError`] is the single terminal error type a caller receives; its
//! variants map one-to-one onto the failure classes of the upload pipeline.
//! [`TransportError`], [`ApiError`], and [`PlanError`] are the leaf errors
//! produced by the transport seam, the negotiation backend, and the part
//! planner. Abort failures are deliberately absent from [`UploadError`]:
//! best-effort cleanup is logged and never surfaces as the primary error.

use http::StatusCode;
use medialift_model::StorageKey;

// ---------------------------------------------------------------------------
// Leaf errors
// ---------------------------------------------------------------------------

/// Failure of a single PUT against a presigned URL.
///
/// The transport performs no retries; a failed PUT fails its part, and the
/// first failed part fails the attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed mid-stream.
    #[error("transfer failed: {message}")]
    Network {
        /// Description of the underlying I/O failure.
        message: String,
    },

    /// The object store answered with a non-success status.
    #[error("object store rejected the transfer with status {status}")]
    Status {
        /// The HTTP status of the response.
        status: StatusCode,
    },

    /// The attempt was cancelled before this transfer was issued.
    ///
    /// Cancellation is injected into the fail-fast path so that cleanup
    /// follows the exact same route as a transfer failure.
    #[error("upload attempt cancelled")]
    Cancelled,
}

/// Failure of a negotiation backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent.
    #[error("backend call `{endpoint}` failed: {message}")]
    Network {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// Description of the underlying failure.
        message: String,
    },

    /// The backend answered with a non-success status.
    #[error("backend call `{endpoint}` returned status {status}")]
    Status {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// The HTTP status of the response.
        status: StatusCode,
    },

    /// The backend answered 2xx but the body did not decode.
    #[error("backend call `{endpoint}` returned a malformed body: {message}")]
    Decode {
        /// The endpoint that was called.
        endpoint: &'static str,
        /// Description of the decode failure.
        message: String,
    },
}

/// Failure to derive part jobs from a file size and a multipart target.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// A zero-byte source can never produce a part.
    #[error("refusing to plan an upload for an empty source")]
    EmptySource,

    /// The chunk size must be non-zero to divide the file.
    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    /// The target carries a different number of part URLs than the file needs.
    #[error("target supplied {actual} part URLs but the file divides into {expected} parts")]
    PartCountMismatch {
        /// Part count derived from file size and chunk size.
        expected: u32,
        /// Number of presigned URLs the target actually carries.
        actual: usize,
    },

    /// The target's declared part total disagrees with the derived count.
    #[error("target declares {declared} total parts but the file divides into {expected}")]
    TotalPartsMismatch {
        /// Part count derived from file size and chunk size.
        expected: u32,
        /// Part count declared by the backend.
        declared: u32,
    },
}

// ---------------------------------------------------------------------------
// UploadError
// ---------------------------------------------------------------------------

/// Terminal error of one upload attempt.
///
/// Exactly one of these is produced per failed attempt. Intermediate
/// per-part failures are not individually surfaced; the first unrecoverable
/// failure ends the attempt.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Zero-byte or unreadable source; rejected before any network call.
    #[error("invalid upload input: {reason}")]
    InvalidInput {
        /// Why the input was rejected.
        reason: String,
    },

    /// The initiate-upload call failed or returned a malformed target.
    ///
    /// No cleanup is attempted: the attempt never owned server-side state.
    #[error("upload negotiation failed: {reason}")]
    Negotiation {
        /// Description of the negotiation failure.
        reason: String,
    },

    /// A part or whole-file PUT failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx part response lacked the mandatory `ETag` header.
    ///
    /// The object store's contract was violated; this is a hard failure and
    /// is never retried.
    #[error("part {part_number} response was missing the ETag header")]
    MissingETag {
        /// The part whose response violated the contract.
        part_number: u32,
    },

    /// Completion or confirmation failed after the bytes were durably stored.
    ///
    /// The storage key (and, for multipart, the upload id) are attached so a
    /// caller can retry completion manually without re-uploading. The
    /// library itself never retries.
    #[error("completing upload for `{storage_key}` failed: {source}")]
    Completion {
        /// The storage key the bytes were written under.
        storage_key: StorageKey,
        /// The multipart upload id, when the attempt was multipart.
        upload_id: Option<String>,
        /// The backend failure that interrupted completion.
        #[source]
        source: ApiError,
    },
}

impl UploadError {
    /// Shorthand for an [`UploadError::InvalidInput`].
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`UploadError::Negotiation`].
    #[must_use]
    pub fn negotiation(reason: impl Into<String>) -> Self {
        Self::Negotiation {
            reason: reason.into(),
        }
    }

    /// The machine-readable kind of this error.
    #[must_use]
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            Self::InvalidInput { .. } => UploadErrorKind::InvalidInput,
            Self::Negotiation { .. } => UploadErrorKind::Negotiation,
            Self::Transport(_) => UploadErrorKind::Transport,
            Self::MissingETag { .. } => UploadErrorKind::MissingETag,
            Self::Completion { .. } => UploadErrorKind::Completion,
        }
    }

    /// The HTTP status carried by a transport failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(TransportError::Status { status }) => Some(*status),
            _ => None,
        }
    }
}

/// Machine-readable error kind, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadErrorKind {
    /// Input rejected before any network call.
    InvalidInput,
    /// Negotiation with the backend failed.
    Negotiation,
    /// A transfer to the object store failed.
    Transport,
    /// A part response violated the ETag contract.
    MissingETag,
    /// Completion failed after the bytes were stored.
    Completion,
}

/// Convenience result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;
