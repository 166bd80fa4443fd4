//! Bounded-concurrency scheduling of part transfers.
//!
//! Runs the planned [`PartJob`]s through the transport with at most
//! `concurrency_limit` transfers in flight, which also bounds resident part
//! buffers. Part PUTs always carry `Content-Type: application/octet-stream`;
//! the asset's real MIME type is only sent on the single-PUT path.
//!
//! Failure policy is fail-fast: the first part to fail trips the shared
//! cancellation token (so no further parts are dispatched), the remaining
//! in-flight transfers are torn down best-effort, and the first error is
//! returned. Discarded results never reach the completion payload.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use medialift_model::{PartJob, PartResult};

use crate::cancel::CancelToken;
use crate::error::{TransportError, UploadError, UploadResult};
use crate::progress::{ProgressCallback, ProgressState};
use crate::source::UploadSource;
use crate::transport::{ObjectTransport, ProgressObserver};

/// Upload all parts, returning their completion tokens ascending by part
/// number.
///
/// Completion order among parts is concurrency-dependent and irrelevant;
/// results accumulate keyed by part number and come back sorted, as the
/// object store's completion call requires.
///
/// # Errors
///
/// Returns the first part failure: a [`TransportError`] wrapped in
/// [`UploadError::Transport`], or [`UploadError::MissingETag`] when a 2xx
/// part response lacked the mandatory header.
pub async fn run_all<T>(
    transport: &T,
    source: &UploadSource,
    jobs: Vec<PartJob>,
    concurrency_limit: usize,
    progress: &Arc<ProgressState>,
    on_progress: Option<&ProgressCallback>,
    cancel: &CancelToken,
) -> UploadResult<Vec<PartResult>>
where
    T: ObjectTransport + ?Sized,
{
    let total = jobs.len();
    let on_progress = on_progress.cloned();

    let mut transfers = futures::stream::iter(jobs.into_iter().map(|job| {
        let progress = Arc::clone(progress);
        let on_progress = on_progress.clone();
        async move {
            if cancel.is_cancelled() {
                return Err(UploadError::Transport(TransportError::Cancelled));
            }
            upload_one_part(transport, source, job, progress, on_progress).await
        }
    }))
    .buffer_unordered(concurrency_limit.max(1));

    let mut results: BTreeMap<u32, PartResult> = BTreeMap::new();
    while let Some(outcome) = transfers.next().await {
        match outcome {
            Ok(part) => {
                results.insert(part.part_number, part);
            }
            Err(err) => {
                // Stop dispatching queued parts through the same path a
                // caller-initiated cancellation takes.
                cancel.cancel();
                return Err(err);
            }
        }
    }

    debug!(parts = results.len(), total, "all parts transferred");
    Ok(results.into_values().collect())
}

/// Transfer one part and validate its completion token.
async fn upload_one_part<T>(
    transport: &T,
    source: &UploadSource,
    job: PartJob,
    progress: Arc<ProgressState>,
    on_progress: Option<ProgressCallback>,
) -> UploadResult<PartResult>
where
    T: ObjectTransport + ?Sized,
{
    let body = source.read_range(job.range).await?;
    let part_len = body.len() as u64;
    let slot = (job.part_number - 1) as usize;

    let observer: ProgressObserver = {
        let progress = Arc::clone(&progress);
        let on_progress = on_progress.clone();
        Arc::new(move |bytes_sent| {
            let percent = progress.record(slot, bytes_sent.min(part_len));
            if let Some(callback) = &on_progress {
                callback(percent);
            }
        })
    };

    debug!(
        part_number = job.part_number,
        len = part_len,
        "dispatching part transfer"
    );

    let outcome = transport
        .put_bytes(&job.url, body, &mime::APPLICATION_OCTET_STREAM, observer)
        .await
        .map_err(UploadError::Transport)?;

    // The transfer is done; settle the slot at its full length even if the
    // transport reported progress coarsely.
    let percent = progress.record(slot, part_len);
    if let Some(callback) = &on_progress {
        callback(percent);
    }

    match outcome.etag {
        Some(e_tag) => Ok(PartResult {
            part_number: job.part_number,
            e_tag,
        }),
        None => Err(UploadError::MissingETag {
            part_number: job.part_number,
        }),
    }
}
