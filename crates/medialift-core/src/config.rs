//! Upload policy configuration.
//!
//! Provides [`UploadConfig`] for tuning the orchestrator. All values have
//! production defaults and can be loaded from environment variables via
//! [`UploadConfig::from_env`]. The single-part threshold mirrors the
//! backend's policy for observability only; the backend-issued target shape
//! is what actually selects the upload path.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Upload orchestrator configuration.
///
/// # Examples
///
/// ```
/// use medialift_core::config::UploadConfig;
///
/// let config = UploadConfig::default();
/// assert_eq!(config.concurrency_limit, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Base URL of the upload negotiation backend.
    #[builder(default = String::from("http://localhost:8080"))]
    pub backend_url: String,

    /// Files at or below this size are expected to take the single-PUT path.
    ///
    /// Local mirror of the backend policy (100 MiB); used only to log when
    /// the backend's decision diverges, never to choose the path.
    #[builder(default = 104_857_600)]
    pub single_part_threshold_bytes: u64,

    /// Maximum number of part transfers in flight at once.
    #[builder(default = 5)]
    pub concurrency_limit: usize,

    /// Granularity of request-body streaming and progress reporting.
    #[builder(default = 65_536)]
    pub body_chunk_bytes: usize,

    /// Connection timeout for every HTTP request, in seconds.
    #[builder(default = 10)]
    pub connect_timeout_secs: u64,

    /// Per-request timeout, in seconds. A stalled part PUT times out and is
    /// treated as a transfer failure.
    #[builder(default = 300)]
    pub request_timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            backend_url: String::from("http://localhost:8080"),
            single_part_threshold_bytes: 104_857_600,
            concurrency_limit: 5,
            body_chunk_bytes: 65_536,
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MEDIALIFT_BACKEND_URL` | `http://localhost:8080` |
    /// | `MEDIALIFT_SINGLE_PART_THRESHOLD_BYTES` | `104857600` |
    /// | `MEDIALIFT_CONCURRENCY_LIMIT` | `5` |
    /// | `MEDIALIFT_BODY_CHUNK_BYTES` | `65536` |
    /// | `MEDIALIFT_CONNECT_TIMEOUT_SECS` | `10` |
    /// | `MEDIALIFT_REQUEST_TIMEOUT_SECS` | `300` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("MEDIALIFT_BACKEND_URL") {
            config.backend_url = v;
        }
        if let Ok(v) = std::env::var("MEDIALIFT_SINGLE_PART_THRESHOLD_BYTES") {
            if let Ok(n) = v.parse::<u64>() {
                config.single_part_threshold_bytes = n;
            }
        }
        if let Ok(v) = std::env::var("MEDIALIFT_CONCURRENCY_LIMIT") {
            if let Ok(n) = v.parse::<usize>() {
                config.concurrency_limit = n.max(1);
            }
        }
        if let Ok(v) = std::env::var("MEDIALIFT_BODY_CHUNK_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                config.body_chunk_bytes = n.max(1);
            }
        }
        if let Ok(v) = std::env::var("MEDIALIFT_CONNECT_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.connect_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("MEDIALIFT_REQUEST_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_secs = n;
            }
        }

        config
    }
}
