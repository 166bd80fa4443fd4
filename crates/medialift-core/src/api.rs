//! Seam for the upload negotiation backend.
//!
//! The backend mints presigned URLs, owns the single-vs-multipart policy,
//! assembles finished multipart uploads, and records object metadata. The
//! coordinator drives these four calls; everything else about the backend
//! (authentication, URL minting, persistence) is out of this crate's view.

use async_trait::async_trait;

use medialift_model::{
    AbortMultipartRequest, CompleteMultipartRequest, ConfirmUploadRequest, ConfirmUploadResponse,
    InitiateUploadRequest, UploadTarget,
};

use crate::error::ApiError;

/// Client for the upload negotiation backend.
#[async_trait]
pub trait NegotiationApi: Send + Sync {
    /// Ask for an upload target. The response shape picks the upload path.
    async fn initiate_upload(
        &self,
        request: InitiateUploadRequest,
    ) -> Result<UploadTarget, ApiError>;

    /// Assemble a finished multipart upload server-side.
    ///
    /// `request.parts` must be sorted ascending by part number.
    async fn complete_multipart(&self, request: CompleteMultipartRequest) -> Result<(), ApiError>;

    /// Discard server-side multipart state. Best-effort; the caller logs
    /// and swallows failures.
    async fn abort_multipart(&self, request: AbortMultipartRequest) -> Result<(), ApiError>;

    /// Confirm the uploaded object with the metadata service, receiving the
    /// durable asset id.
    async fn confirm_upload(
        &self,
        request: ConfirmUploadRequest,
    ) -> Result<ConfirmUploadResponse, ApiError>;
}
