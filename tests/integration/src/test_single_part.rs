//! Single-PUT path integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use medialift_core::{ProgressCallback, UploadRequest, UploadSource};
    use parking_lot::Mutex;

    use crate::{coordinator, synthetic_payload, test_metadata};

    #[tokio::test]
    #[ignore = "requires running backend"]
    async fn test_should_upload_small_asset_in_one_put() {
        let co = coordinator();

        // Well under any sane single-part threshold.
        let payload = synthetic_payload(5 * 1024 * 1024);
        let request = UploadRequest::builder()
            .source(UploadSource::from_bytes(payload))
            .mime_type("video/mp4".parse().expect("valid mime"))
            .metadata(test_metadata("single"))
            .build();

        let asset_id = co
            .upload(request, None)
            .await
            .expect("single-part upload succeeds");

        assert!(!asset_id.as_str().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running backend"]
    async fn test_should_report_monotonic_progress_for_single_put() {
        let co = coordinator();

        let payload = synthetic_payload(2 * 1024 * 1024);
        let request = UploadRequest::builder()
            .source(UploadSource::from_bytes(payload))
            .mime_type("video/webm".parse().expect("valid mime"))
            .metadata(test_metadata("single-progress"))
            .build();

        let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |percent| sink.lock().push(percent));

        co.upload(request, Some(callback))
            .await
            .expect("upload succeeds");

        let seen = seen.lock();
        assert!(!seen.is_empty(), "progress was never reported");
        for pair in seen.windows(2) {
            assert!(pair[1] >= pair[0], "progress went backwards: {pair:?}");
        }
        assert!((seen.last().expect("nonempty") - 100.0).abs() < f64::EPSILON);
    }
}
