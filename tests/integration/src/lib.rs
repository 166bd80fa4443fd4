//! Integration tests for the medialift upload orchestrator.
//!
//! These tests require a running negotiation backend (and its object
//! storage) reachable at `MEDIALIFT_BACKEND_URL`. They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! MEDIALIFT_BACKEND_URL=http://localhost:8080 \
//!     cargo test -p medialift-integration -- --ignored
//! ```

use std::sync::Once;

use medialift_core::{UploadConfig, UploadCoordinator};
use medialift_http::{BackendClient, HttpObjectTransport};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Build a coordinator pointing at the environment-configured backend.
#[must_use]
pub fn coordinator() -> UploadCoordinator<BackendClient, HttpObjectTransport> {
    init_tracing();

    let config = UploadConfig::from_env();
    let api = BackendClient::new(&config).expect("backend client builds");
    let transport = HttpObjectTransport::new(&config).expect("transport builds");
    UploadCoordinator::new(api, transport, config)
}

/// Generate a payload of pseudo-random bytes.
#[must_use]
pub fn synthetic_payload(len: usize) -> Vec<u8> {
    use rand::Rng;

    let mut data = vec![0u8; len];
    rand::rng().fill_bytes(&mut data);
    data
}

/// Caller metadata tagging the object as test data, with a unique marker.
#[must_use]
pub fn test_metadata(prefix: &str) -> serde_json::Value {
    let marker = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
    serde_json::json!({
        "source": "medialift-integration",
        "name": format!("{prefix}-{marker}"),
    })
}

mod test_multipart;
mod test_single_part;
