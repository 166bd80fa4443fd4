//! Presigned-URL PUT transport over reqwest.
//!
//! One [`ObjectTransport::put_bytes`] call issues exactly one PUT. The body
//! streams in fixed-size chunks; the progress observer fires with the
//! cumulative byte count as each chunk is handed to the connection. No
//! retries happen here: a partially-streamed PUT against a presigned URL is
//! not guaranteed idempotent by the object store, so the first failure ends
//! the transfer.

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use mime::Mime;
use tracing::{debug, trace};

use medialift_core::config::UploadConfig;
use medialift_core::error::TransportError;
use medialift_core::transport::{ObjectTransport, ProgressObserver, PutOutcome};

/// [`ObjectTransport`] backed by a shared reqwest client.
///
/// Presigned URLs carry their authorization in query parameters, so no
/// auth headers are attached; each request relies on the client's connect
/// and request timeouts to bound a stalled transfer.
#[derive(Debug, Clone)]
pub struct HttpObjectTransport {
    client: reqwest::Client,
    chunk_bytes: usize,
}

impl HttpObjectTransport {
    /// Build a transport from the upload configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &UploadConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            chunk_bytes: config.body_chunk_bytes.max(1),
        })
    }
}

#[async_trait]
impl ObjectTransport for HttpObjectTransport {
    async fn put_bytes(
        &self,
        url: &str,
        body: Bytes,
        content_type: &Mime,
        observer: ProgressObserver,
    ) -> Result<PutOutcome, TransportError> {
        let total = body.len() as u64;
        let stream = progress_chunks(body, self.chunk_bytes, observer);

        let response = self
            .client
            .put(url)
            .header(http::header::CONTENT_TYPE, content_type.as_ref())
            .header(http::header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { status });
        }

        let etag = response
            .headers()
            .get(http::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        debug!(len = total, status = %status, etag = ?etag, "presigned PUT complete");
        Ok(PutOutcome { etag })
    }
}

/// Split a body into fixed-size chunks, reporting the cumulative byte count
/// as each chunk is pulled by the connection.
///
/// The reported count is monotonically non-decreasing and capped at the
/// body length; `Bytes::slice` keeps the chunks zero-copy.
fn progress_chunks(
    body: Bytes,
    chunk_bytes: usize,
    observer: ProgressObserver,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let total = body.len();
    let mut offset = 0usize;

    futures::stream::iter(std::iter::from_fn(move || {
        if offset >= total {
            return None;
        }
        let end = (offset + chunk_bytes).min(total);
        let piece = body.slice(offset..end);
        offset = end;
        trace!(sent = end, total, "body chunk handed to transport");
        observer(end as u64);
        Some(Ok(piece))
    }))
}
