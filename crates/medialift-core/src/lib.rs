//! Upload session orchestration for medialift.
//!
//! This crate turns one asset and one negotiation backend into one durable
//! asset id, pushing the bytes to object storage through short-lived
//! presigned URLs. The backend decides between a single PUT and a multipart
//! upload; this crate plans part ranges, schedules bounded-concurrency
//! transfers, aggregates progress, and deterministically cleans up
//! server-side multipart state on any failure.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   |
//!   v
//! UploadCoordinator (state machine, finalize gate)
//!   |                \
//!   v                 v
//! planner          NegotiationApi (initiate / complete / abort / confirm)
//!   |
//!   v
//! scheduler (bounded pool, fail-fast)
//!   |
//!   v
//! N x ObjectTransport::put_bytes (presigned PUTs)
//! ```
//!
//! The `NegotiationApi` and `ObjectTransport` seams are implemented over
//! HTTP in `medialift-http`.

pub mod api;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod planner;
pub mod progress;
pub mod scheduler;
pub mod source;
pub mod transport;

pub use api::NegotiationApi;
pub use cancel::CancelToken;
pub use config::UploadConfig;
pub use coordinator::{AttemptState, UploadCoordinator, UploadRequest};
pub use error::{ApiError, PlanError, TransportError, UploadError, UploadErrorKind, UploadResult};
pub use progress::{ProgressCallback, ProgressState};
pub use source::UploadSource;
pub use transport::{ObjectTransport, ProgressObserver, PutOutcome};
