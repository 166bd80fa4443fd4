//! HTTP implementations of the medialift seams.
//!
//! [`BackendClient`] speaks JSON to the upload negotiation backend and
//! [`HttpObjectTransport`] streams presigned PUTs to object storage. Wire
//! them into a coordinator:
//!
//! ```no_run
//! use medialift_core::{UploadConfig, UploadCoordinator};
//! use medialift_http::{BackendClient, HttpObjectTransport};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UploadConfig::from_env();
//! let api = BackendClient::new(&config)?;
//! let transport = HttpObjectTransport::new(&config)?;
//! let coordinator = UploadCoordinator::new(api, transport, config);
//! # let _ = coordinator;
//! # Ok(())
//! # }
//! ```

mod client;
mod transport;

pub use client::BackendClient;
pub use transport::HttpObjectTransport;
