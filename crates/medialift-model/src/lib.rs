//! Data model for the medialift upload orchestrator.
//!
//! This crate defines the wire types exchanged with the upload negotiation
//! backend and the process-local types that flow between the planner, the
//! scheduler, and the session coordinator:
//!
//! - [`UploadTarget`] describes where bytes go, as issued by the backend.
//! - [`PartJob`] / [`PartResult`] are one planned unit of multipart work
//!   and its completion token.
//! - Request/response payloads for the negotiation endpoints.
//!
//! The types here are deliberately passive: byte-range math lives in the
//! planner and orchestration in the coordinator, both in `medialift-core`.

mod api;
mod part;
mod target;
mod types;

pub use api::{
    AbortMultipartRequest, CompleteMultipartRequest, ConfirmUploadRequest, ConfirmUploadResponse,
    InitiateUploadRequest,
};
pub use part::{ByteRange, CompletedPart, PartJob, PartResult};
pub use target::{MultipartTarget, SinglePartTarget, UploadTarget};
pub use types::{AssetId, StorageKey};
