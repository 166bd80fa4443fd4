//! Upload session coordination.
//!
//! One [`UploadCoordinator::upload`] call is one attempt of the state
//! machine `Idle → Negotiating → Uploading → Completing → {Succeeded,
//! Failed}`. The coordinator negotiates the upload target with the backend,
//! drives the single-PUT or planner/scheduler path depending on the shape
//! the backend issued, and owns the one piece of state that must never be
//! raced: exactly one terminal backend call (`complete-multipart` or
//! `abort-multipart`) is made per attempt, guarded by a single-shot gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use medialift_model::{
    AbortMultipartRequest, AssetId, ByteRange, CompleteMultipartRequest, CompletedPart,
    ConfirmUploadRequest, InitiateUploadRequest, MultipartTarget, PartResult, SinglePartTarget,
    StorageKey, UploadTarget,
};

use crate::api::NegotiationApi;
use crate::cancel::CancelToken;
use crate::config::UploadConfig;
use crate::error::{TransportError, UploadError, UploadResult};
use crate::planner::{self, PlanDecision};
use crate::progress::{ProgressCallback, ProgressState};
use crate::scheduler;
use crate::source::UploadSource;
use crate::transport::{ObjectTransport, ProgressObserver};

// ---------------------------------------------------------------------------
// Attempt state machine
// ---------------------------------------------------------------------------

/// Lifecycle states of one upload attempt.
///
/// Terminal states are final: a fresh attempt starts a fresh state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Nothing has happened yet.
    Idle,
    /// Asking the backend for an upload target.
    Negotiating,
    /// Bytes are moving to the object store.
    Uploading,
    /// All bytes are stored; assembling and confirming.
    Completing,
    /// The attempt produced an asset id.
    Succeeded,
    /// The attempt ended with a terminal error.
    Failed,
}

impl AttemptState {
    /// Whether this state admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Negotiating)
                | (Self::Negotiating, Self::Uploading)
                | (Self::Uploading, Self::Completing)
                | (Self::Completing, Self::Succeeded)
                | (
                    Self::Idle | Self::Negotiating | Self::Uploading | Self::Completing,
                    Self::Failed
                )
        )
    }
}

/// Single-shot gate around the terminal backend call of an attempt.
///
/// A race between "last part succeeded, completing" and "an earlier part's
/// failure signal arriving late" must not produce two terminal calls; the
/// first caller to flip the flag wins.
#[derive(Debug, Default)]
pub(crate) struct FinalizeGate {
    finalized: AtomicBool,
}

impl FinalizeGate {
    /// Claim the right to make the terminal call. Returns `true` exactly
    /// once per gate.
    pub(crate) fn try_finalize(&self) -> bool {
        self.finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Per-attempt bookkeeping: correlation id, current state, finalize gate.
#[derive(Debug)]
struct Attempt {
    id: String,
    state: AttemptState,
    gate: FinalizeGate,
}

impl Attempt {
    fn new() -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_owned();
        Self {
            id,
            state: AttemptState::Idle,
            gate: FinalizeGate::default(),
        }
    }

    fn advance(&mut self, next: AttemptState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal attempt transition {:?} -> {next:?}",
            self.state
        );
        debug!(attempt = %self.id, from = ?self.state, to = ?next, "attempt state change");
        self.state = next;
    }
}

// ---------------------------------------------------------------------------
// UploadRequest
// ---------------------------------------------------------------------------

/// One asset to upload, with the caller's metadata and cancellation handle.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct UploadRequest {
    /// Where the bytes come from.
    pub source: UploadSource,
    /// The asset's real MIME type. Sent on the single PUT and in the
    /// initiate/confirm calls; part PUTs always use `application/octet-stream`.
    pub mime_type: mime::Mime,
    /// Caller metadata forwarded verbatim to the confirmation endpoint.
    #[builder(default = serde_json::Value::Null)]
    pub metadata: serde_json::Value,
    /// Cancellation handle; tripping it injects a failure through the
    /// fail-fast path.
    #[builder(default)]
    pub cancel: CancelToken,
}

// ---------------------------------------------------------------------------
// UploadCoordinator
// ---------------------------------------------------------------------------

/// Drives complete upload attempts against a negotiation backend and an
/// object-store transport.
#[derive(Debug)]
pub struct UploadCoordinator<A, T> {
    api: A,
    transport: T,
    config: UploadConfig,
}

impl<A, T> UploadCoordinator<A, T>
where
    A: NegotiationApi,
    T: ObjectTransport,
{
    /// Create a coordinator over the given backend client and transport.
    pub fn new(api: A, transport: T, config: UploadConfig) -> Self {
        Self {
            api,
            transport,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload one asset, reporting whole-file progress (0..=100) through
    /// `on_progress`, and return its durable asset id.
    ///
    /// # Errors
    ///
    /// Returns the attempt's single terminal [`UploadError`]; intermediate
    /// per-part failures are not individually surfaced.
    pub async fn upload(
        &self,
        request: UploadRequest,
        on_progress: Option<ProgressCallback>,
    ) -> UploadResult<AssetId> {
        let mut attempt = Attempt::new();
        let result = self.run_attempt(&mut attempt, &request, on_progress).await;

        match &result {
            Ok(asset_id) => {
                attempt.advance(AttemptState::Succeeded);
                info!(attempt = %attempt.id, asset_id = %asset_id, "upload succeeded");
            }
            Err(err) => {
                attempt.advance(AttemptState::Failed);
                warn!(attempt = %attempt.id, kind = ?err.kind(), error = %err, "upload failed");
            }
        }

        result
    }

    async fn run_attempt(
        &self,
        attempt: &mut Attempt,
        request: &UploadRequest,
        on_progress: Option<ProgressCallback>,
    ) -> UploadResult<AssetId> {
        let file_size = request.source.byte_len().await?;
        if file_size == 0 {
            return Err(UploadError::invalid_input(
                "refusing to upload an empty source",
            ));
        }

        attempt.advance(AttemptState::Negotiating);
        let target = self
            .api
            .initiate_upload(InitiateUploadRequest {
                mime_type: request.mime_type.to_string(),
                file_size_bytes: file_size,
            })
            .await
            .map_err(|e| UploadError::negotiation(e.to_string()))?;

        debug!(
            attempt = %attempt.id,
            storage_key = %target.storage_key(),
            file_size,
            "negotiated upload target"
        );

        attempt.advance(AttemptState::Uploading);
        match target {
            UploadTarget::SinglePart(target) => {
                self.upload_single_part(attempt, request, file_size, &target, on_progress)
                    .await
            }
            UploadTarget::Multipart(target) => {
                self.upload_multipart(attempt, request, file_size, &target, on_progress)
                    .await
            }
        }
    }

    /// Whole-object PUT with the asset's real MIME type. The PUT itself is
    /// the complete operation; only metadata confirmation follows.
    async fn upload_single_part(
        &self,
        attempt: &mut Attempt,
        request: &UploadRequest,
        file_size: u64,
        target: &SinglePartTarget,
        on_progress: Option<ProgressCallback>,
    ) -> UploadResult<AssetId> {
        if request.cancel.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        let body = request
            .source
            .read_range(ByteRange::new(0, file_size))
            .await?;

        let progress = Arc::new(ProgressState::new(file_size, 1));
        let observer: ProgressObserver = {
            let progress = Arc::clone(&progress);
            let on_progress = on_progress.clone();
            Arc::new(move |bytes_sent| {
                let percent = progress.record(0, bytes_sent.min(file_size));
                if let Some(callback) = &on_progress {
                    callback(percent);
                }
            })
        };

        self.transport
            .put_bytes(&target.upload_url, body, &request.mime_type, observer)
            .await
            .map_err(UploadError::Transport)?;

        let percent = progress.record(0, file_size);
        if let Some(callback) = &on_progress {
            callback(percent);
        }

        attempt.advance(AttemptState::Completing);
        self.confirm(attempt, target.storage_key.clone(), None, file_size, request)
            .await
    }

    /// Planner + scheduler path; cleans up server-side multipart state on
    /// any failure.
    async fn upload_multipart(
        &self,
        attempt: &mut Attempt,
        request: &UploadRequest,
        file_size: u64,
        target: &MultipartTarget,
        on_progress: Option<ProgressCallback>,
    ) -> UploadResult<AssetId> {
        // Observability only: the backend's shape decides the path, but log
        // when it diverges from the local policy mirror.
        if let Ok(PlanDecision::SinglePart) = planner::plan(
            file_size,
            self.config.single_part_threshold_bytes,
            target.chunk_size_bytes,
        ) {
            debug!(
                attempt = %attempt.id,
                file_size,
                "backend chose multipart below the local single-part threshold"
            );
        }

        let jobs = planner::part_jobs(file_size, target)
            .map_err(|e| UploadError::negotiation(format!("malformed multipart target: {e}")))?;

        let progress = Arc::new(ProgressState::new(file_size, jobs.len()));
        info!(
            attempt = %attempt.id,
            upload_id = %target.upload_id,
            parts = jobs.len(),
            concurrency = self.config.concurrency_limit,
            "starting multipart transfer"
        );

        let outcome = scheduler::run_all(
            &self.transport,
            &request.source,
            jobs,
            self.config.concurrency_limit,
            &progress,
            on_progress.as_ref(),
            &request.cancel,
        )
        .await;

        match outcome {
            Ok(results) => {
                attempt.advance(AttemptState::Completing);
                self.complete_multipart(attempt, target, results).await?;
                self.confirm(
                    attempt,
                    target.storage_key.clone(),
                    Some(target.upload_id.clone()),
                    file_size,
                    request,
                )
                .await
            }
            Err(err) => Err(self.abort_multipart(attempt, target, err).await),
        }
    }

    /// Submit the ordered completion payload. Gated: runs at most once per
    /// attempt.
    async fn complete_multipart(
        &self,
        attempt: &Attempt,
        target: &MultipartTarget,
        results: Vec<PartResult>,
    ) -> UploadResult<()> {
        if !attempt.gate.try_finalize() {
            warn!(attempt = %attempt.id, "attempt already finalized; discarding completion");
            return Err(TransportError::Cancelled.into());
        }

        let parts: Vec<CompletedPart> = results.into_iter().map(Into::into).collect();
        self.api
            .complete_multipart(CompleteMultipartRequest {
                storage_key: target.storage_key.clone(),
                upload_id: target.upload_id.clone(),
                parts,
            })
            .await
            .map_err(|source| UploadError::Completion {
                storage_key: target.storage_key.clone(),
                upload_id: Some(target.upload_id.clone()),
                source,
            })?;

        debug!(
            attempt = %attempt.id,
            upload_id = %target.upload_id,
            "multipart upload assembled"
        );
        Ok(())
    }

    /// Best-effort cleanup of server-side multipart state. Gated like
    /// completion; failures are logged and never mask the primary error.
    async fn abort_multipart(
        &self,
        attempt: &Attempt,
        target: &MultipartTarget,
        primary: UploadError,
    ) -> UploadError {
        if !attempt.gate.try_finalize() {
            warn!(attempt = %attempt.id, "attempt already finalized; skipping abort");
            return primary;
        }

        match self
            .api
            .abort_multipart(AbortMultipartRequest {
                storage_key: target.storage_key.clone(),
                upload_id: target.upload_id.clone(),
            })
            .await
        {
            Ok(()) => {
                debug!(
                    attempt = %attempt.id,
                    upload_id = %target.upload_id,
                    "aborted server-side multipart state"
                );
            }
            Err(abort_err) => {
                // An orphaned multipart upload is left for the storage
                // provider's lifecycle rules to reap.
                warn!(
                    attempt = %attempt.id,
                    upload_id = %target.upload_id,
                    error = %abort_err,
                    "failed to abort multipart state"
                );
            }
        }

        primary
    }

    /// Confirm object metadata with the backend, yielding the asset id.
    async fn confirm(
        &self,
        attempt: &Attempt,
        storage_key: StorageKey,
        upload_id: Option<String>,
        file_size: u64,
        request: &UploadRequest,
    ) -> UploadResult<AssetId> {
        let response = self
            .api
            .confirm_upload(ConfirmUploadRequest {
                storage_key: storage_key.clone(),
                file_size_bytes: file_size,
                mime_type: request.mime_type.to_string(),
                metadata: request.metadata.clone(),
            })
            .await
            .map_err(|source| UploadError::Completion {
                storage_key,
                upload_id,
                source,
            })?;

        debug!(attempt = %attempt.id, asset_id = %response.asset_id, "object confirmed");
        Ok(response.asset_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use parking_lot::Mutex;

    use super::*;
    use crate::error::{ApiError, UploadErrorKind};
    use crate::transport::PutOutcome;
    use medialift_model::ConfirmUploadResponse;

    // -- fakes --------------------------------------------------------------

    #[derive(Default)]
    struct FakeApi {
        target: Mutex<Option<UploadTarget>>,
        fail_complete: AtomicBool,
        fail_confirm: AtomicBool,
        fail_abort: AtomicBool,
        initiate_calls: AtomicUsize,
        complete_calls: AtomicUsize,
        abort_calls: AtomicUsize,
        confirm_calls: AtomicUsize,
        completed_parts: Mutex<Vec<CompletedPart>>,
    }

    impl FakeApi {
        fn with_target(self, target: UploadTarget) -> Self {
            *self.target.lock() = Some(target);
            self
        }
    }

    #[async_trait]
    impl NegotiationApi for FakeApi {
        async fn initiate_upload(
            &self,
            _request: InitiateUploadRequest,
        ) -> Result<UploadTarget, ApiError> {
            self.initiate_calls.fetch_add(1, Ordering::SeqCst);
            self.target.lock().clone().ok_or(ApiError::Status {
                endpoint: "initiate-upload",
                status: StatusCode::SERVICE_UNAVAILABLE,
            })
        }

        async fn complete_multipart(
            &self,
            request: CompleteMultipartRequest,
        ) -> Result<(), ApiError> {
            self.complete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_complete.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    endpoint: "complete-multipart",
                    status: StatusCode::BAD_GATEWAY,
                });
            }
            *self.completed_parts.lock() = request.parts;
            Ok(())
        }

        async fn abort_multipart(&self, _request: AbortMultipartRequest) -> Result<(), ApiError> {
            self.abort_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_abort.load(Ordering::SeqCst) {
                return Err(ApiError::Network {
                    endpoint: "abort-multipart",
                    message: "connection reset".to_owned(),
                });
            }
            Ok(())
        }

        async fn confirm_upload(
            &self,
            _request: ConfirmUploadRequest,
        ) -> Result<ConfirmUploadResponse, ApiError> {
            self.confirm_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_confirm.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    endpoint: "confirm-upload",
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            Ok(ConfirmUploadResponse {
                asset_id: AssetId::new("asset-ok"),
            })
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        puts: Mutex<Vec<(String, String)>>,
        no_etag: Mutex<HashMap<String, bool>>,
        failures: Mutex<HashMap<String, u16>>,
    }

    impl FakeTransport {
        fn failing(self, url: &str, status: u16) -> Self {
            self.failures.lock().insert(url.to_owned(), status);
            self
        }

        fn without_etag(self, url: &str) -> Self {
            self.no_etag.lock().insert(url.to_owned(), true);
            self
        }

        fn put_count(&self) -> usize {
            self.puts.lock().len()
        }
    }

    #[async_trait]
    impl ObjectTransport for FakeTransport {
        async fn put_bytes(
            &self,
            url: &str,
            body: Bytes,
            content_type: &mime::Mime,
            observer: ProgressObserver,
        ) -> Result<PutOutcome, TransportError> {
            self.puts
                .lock()
                .push((url.to_owned(), content_type.to_string()));

            if let Some(&status) = self.failures.lock().get(url) {
                return Err(TransportError::Status {
                    status: StatusCode::from_u16(status).expect("valid status"),
                });
            }

            observer(body.len() as u64);

            let etag = if self.no_etag.lock().contains_key(url) {
                None
            } else {
                Some(format!("\"etag-{url}\""))
            };
            Ok(PutOutcome { etag })
        }
    }

    // -- helpers ------------------------------------------------------------

    fn single_target() -> UploadTarget {
        UploadTarget::SinglePart(SinglePartTarget {
            upload_url: "https://store/whole".to_owned(),
            storage_key: StorageKey::new("videos/take-1.mp4"),
        })
    }

    fn multipart_target(parts: u32, chunk: u64) -> UploadTarget {
        UploadTarget::Multipart(MultipartTarget {
            upload_id: "mpu-1".to_owned(),
            storage_key: StorageKey::new("videos/big.mp4"),
            part_urls: (1..=parts).map(|n| format!("https://store/part-{n}")).collect(),
            chunk_size_bytes: chunk,
            total_parts: parts,
        })
    }

    fn request_for(len: usize) -> UploadRequest {
        UploadRequest::builder()
            .source(UploadSource::from_bytes(vec![0x5Au8; len]))
            .mime_type("video/mp4".parse().expect("valid mime"))
            .build()
    }

    fn coordinator(
        api: FakeApi,
        transport: FakeTransport,
    ) -> UploadCoordinator<FakeApi, FakeTransport> {
        UploadCoordinator::new(api, transport, UploadConfig::default())
    }

    // -- tests --------------------------------------------------------------

    #[tokio::test]
    async fn test_should_upload_small_file_with_its_real_mime_type() {
        let co = coordinator(
            FakeApi::default().with_target(single_target()),
            FakeTransport::default(),
        );

        let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |p| sink.lock().push(p));

        let asset_id = co
            .upload(request_for(5 * 1024 * 1024), Some(callback))
            .await
            .expect("single-part upload succeeds");

        assert_eq!(asset_id.as_str(), "asset-ok");
        let puts = co.transport.puts.lock();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].1, "video/mp4");
        assert_eq!(co.api.complete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.api.confirm_calls.load(Ordering::SeqCst), 1);
        assert!((seen.lock().last().expect("progress reported") - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_should_not_abort_when_single_part_put_fails() {
        let co = coordinator(
            FakeApi::default().with_target(single_target()),
            FakeTransport::default().failing("https://store/whole", 500),
        );

        let err = co
            .upload(request_for(1024), None)
            .await
            .expect_err("PUT fails");

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.api.confirm_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_complete_multipart_with_parts_in_ascending_order() {
        let co = coordinator(
            FakeApi::default().with_target(multipart_target(10, 50)),
            FakeTransport::default(),
        );

        let asset_id = co
            .upload(request_for(500), None)
            .await
            .expect("multipart upload succeeds");

        assert_eq!(asset_id.as_str(), "asset-ok");
        assert_eq!(co.api.complete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.api.confirm_calls.load(Ordering::SeqCst), 1);

        let parts = co.api.completed_parts.lock();
        assert_eq!(parts.len(), 10);
        for (index, part) in parts.iter().enumerate() {
            assert_eq!(part.part_number, index as u32 + 1);
            assert!(part.e_tag.contains(&format!("part-{}", index + 1)));
        }
    }

    #[tokio::test]
    async fn test_should_use_octet_stream_for_part_puts() {
        let co = coordinator(
            FakeApi::default().with_target(multipart_target(4, 25)),
            FakeTransport::default(),
        );

        co.upload(request_for(100), None)
            .await
            .expect("multipart upload succeeds");

        for (_, content_type) in co.transport.puts.lock().iter() {
            assert_eq!(content_type, "application/octet-stream");
        }
    }

    #[tokio::test]
    async fn test_should_abort_exactly_once_when_a_part_fails() {
        let co = coordinator(
            FakeApi::default().with_target(multipart_target(5, 20)),
            FakeTransport::default().failing("https://store/part-3", 403),
        );

        let err = co
            .upload(request_for(100), None)
            .await
            .expect_err("part 3 fails");

        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 1);
        assert_eq!(co.api.complete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_treat_missing_etag_like_a_transfer_failure() {
        let co = coordinator(
            FakeApi::default().with_target(multipart_target(3, 40)),
            FakeTransport::default().without_etag("https://store/part-2"),
        );

        let err = co
            .upload(request_for(120), None)
            .await
            .expect_err("part 2 lacks an etag");

        assert_eq!(err.kind(), UploadErrorKind::MissingETag);
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 1);
        assert_eq!(co.api.complete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_surface_primary_error_when_abort_also_fails() {
        let api = FakeApi::default().with_target(multipart_target(5, 20));
        api.fail_abort.store(true, Ordering::SeqCst);
        let co = coordinator(
            api,
            FakeTransport::default().failing("https://store/part-1", 403),
        );

        let err = co
            .upload(request_for(100), None)
            .await
            .expect_err("part 1 fails");

        // The abort failure is swallowed; the caller sees the 403.
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_route_cancellation_through_the_abort_path() {
        let co = coordinator(
            FakeApi::default().with_target(multipart_target(4, 25)),
            FakeTransport::default(),
        );

        let request = request_for(100);
        request.cancel.cancel();

        let err = co.upload(request, None).await.expect_err("cancelled");

        assert!(matches!(
            err,
            UploadError::Transport(TransportError::Cancelled)
        ));
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 1);
        assert_eq!(co.api.complete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.transport.put_count(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_empty_source_before_any_backend_call() {
        let co = coordinator(
            FakeApi::default().with_target(single_target()),
            FakeTransport::default(),
        );

        let err = co
            .upload(request_for(0), None)
            .await
            .expect_err("empty source");

        assert_eq!(err.kind(), UploadErrorKind::InvalidInput);
        assert_eq!(co.api.initiate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.transport.put_count(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_malformed_multipart_target() {
        // Nine URLs for a file that divides into ten parts.
        let mut target = multipart_target(10, 50);
        if let UploadTarget::Multipart(t) = &mut target {
            t.part_urls.pop();
            t.total_parts = 9;
        }
        let co = coordinator(
            FakeApi::default().with_target(target),
            FakeTransport::default(),
        );

        let err = co
            .upload(request_for(500), None)
            .await
            .expect_err("malformed target");

        assert_eq!(err.kind(), UploadErrorKind::Negotiation);
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.transport.put_count(), 0);
    }

    #[tokio::test]
    async fn test_should_attach_recovery_context_when_completion_fails() {
        let api = FakeApi::default().with_target(multipart_target(2, 64));
        api.fail_complete.store(true, Ordering::SeqCst);
        let co = coordinator(api, FakeTransport::default());

        let err = co
            .upload(request_for(128), None)
            .await
            .expect_err("completion fails");

        match err {
            UploadError::Completion {
                storage_key,
                upload_id,
                ..
            } => {
                assert_eq!(storage_key.as_str(), "videos/big.mp4");
                assert_eq!(upload_id.as_deref(), Some("mpu-1"));
            }
            other => panic!("expected completion error, got {other:?}"),
        }
        // Bytes are durably stored; no abort is issued after completion failed.
        assert_eq!(co.api.abort_calls.load(Ordering::SeqCst), 0);
        assert_eq!(co.api.confirm_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_report_confirm_failure_with_storage_key_only() {
        let api = FakeApi::default().with_target(single_target());
        api.fail_confirm.store(true, Ordering::SeqCst);
        let co = coordinator(api, FakeTransport::default());

        let err = co
            .upload(request_for(256), None)
            .await
            .expect_err("confirmation fails");

        match err {
            UploadError::Completion {
                storage_key,
                upload_id,
                ..
            } => {
                assert_eq!(storage_key.as_str(), "videos/take-1.mp4");
                assert_eq!(upload_id, None);
            }
            other => panic!("expected completion error, got {other:?}"),
        }
    }

    #[test]
    fn test_should_finalize_exactly_once_under_contention() {
        let gate = Arc::new(FinalizeGate::default());
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = gate.clone();
                let wins = wins.clone();
                std::thread::spawn(move || {
                    if gate.try_finalize() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("gate thread");
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_should_keep_terminal_states_final() {
        use AttemptState::*;

        for terminal in [Succeeded, Failed] {
            for next in [Idle, Negotiating, Uploading, Completing, Succeeded, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
            assert!(terminal.is_terminal());
        }
    }

    #[test]
    fn test_should_only_allow_forward_transitions() {
        use AttemptState::*;

        assert!(Idle.can_transition_to(Negotiating));
        assert!(Negotiating.can_transition_to(Uploading));
        assert!(Uploading.can_transition_to(Completing));
        assert!(Completing.can_transition_to(Succeeded));
        assert!(Uploading.can_transition_to(Failed));

        assert!(!Idle.can_transition_to(Uploading));
        assert!(!Negotiating.can_transition_to(Completing));
        assert!(!Uploading.can_transition_to(Succeeded));
        assert!(!Completing.can_transition_to(Uploading));
    }
}
