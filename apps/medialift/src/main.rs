//! medialift - one-shot asset uploader.
//!
//! Uploads a single file through the upload orchestrator and prints the
//! resulting asset id. The negotiation backend decides between a single
//! presigned PUT and a multipart upload; this binary just supplies the file
//! and watches progress.
//!
//! # Usage
//!
//! ```text
//! MEDIALIFT_BACKEND_URL=https://api.example.com medialift recording.mp4 video/mp4
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MEDIALIFT_BACKEND_URL` | `http://localhost:8080` | Negotiation backend base URL |
//! | `MEDIALIFT_CONCURRENCY_LIMIT` | `5` | Parallel part transfers |
//! | `MEDIALIFT_REQUEST_TIMEOUT_SECS` | `300` | Per-request timeout |
//! | `MEDIALIFT_METADATA` | *(unset)* | JSON object forwarded to confirm-upload |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use medialift_core::{ProgressCallback, UploadConfig, UploadCoordinator, UploadRequest, UploadSource};
use medialift_http::{BackendClient, HttpObjectTransport};

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Parse the caller metadata from `MEDIALIFT_METADATA`, if set.
fn parse_metadata() -> Result<serde_json::Value> {
    match std::env::var("MEDIALIFT_METADATA") {
        Ok(raw) => serde_json::from_str(&raw).context("MEDIALIFT_METADATA is not valid JSON"),
        Err(_) => Ok(serde_json::Value::Null),
    }
}

/// Progress callback that logs once per whole percentage point.
fn progress_logger() -> ProgressCallback {
    let last_logged = Arc::new(AtomicU64::new(0));
    Arc::new(move |percent| {
        let whole = percent as u64;
        if whole > last_logged.swap(whole, Ordering::Relaxed) {
            info!(percent = whole, "upload progress");
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(&log_level())?;

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: medialift <file> [mime-type]");
    };
    let mime_type: mime::Mime = args
        .next()
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
        .parse()
        .context("invalid MIME type argument")?;

    let config = UploadConfig::from_env();
    let api = BackendClient::new(&config).context("cannot build backend client")?;
    let transport = HttpObjectTransport::new(&config).context("cannot build transport")?;

    info!(
        backend_url = %config.backend_url,
        concurrency = config.concurrency_limit,
        file = %path,
        mime_type = %mime_type,
        "starting upload"
    );

    let coordinator = UploadCoordinator::new(api, transport, config);
    let request = UploadRequest::builder()
        .source(UploadSource::from_path(&path))
        .mime_type(mime_type)
        .metadata(parse_metadata()?)
        .build();

    let asset_id = coordinator
        .upload(request, Some(progress_logger()))
        .await
        .with_context(|| format!("upload of {path} failed"))?;

    println!("{asset_id}");
    Ok(())
}
