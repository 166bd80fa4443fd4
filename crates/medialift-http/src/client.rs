//! JSON client for the upload negotiation backend.
//!
//! Four POST endpoints, camelCase JSON bodies. The client performs no
//! retries on any of them: negotiation failures end the attempt before any
//! state exists, and completion failures are surfaced with enough context
//! for the caller to recover manually.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use medialift_core::api::NegotiationApi;
use medialift_core::config::UploadConfig;
use medialift_core::error::ApiError;
use medialift_model::{
    AbortMultipartRequest, CompleteMultipartRequest, ConfirmUploadRequest, ConfirmUploadResponse,
    InitiateUploadRequest, UploadTarget,
};

const INITIATE_ENDPOINT: &str = "uploads/initiate";
const COMPLETE_ENDPOINT: &str = "uploads/complete-multipart";
const ABORT_ENDPOINT: &str = "uploads/abort-multipart";
const CONFIRM_ENDPOINT: &str = "uploads/confirm";

/// [`NegotiationApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for the backend at `config.backend_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &UploadConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network {
                endpoint: "client",
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_owned(),
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// POST a JSON body and decode a JSON response.
    async fn post_json<Req, Resp>(
        &self,
        endpoint: &'static str,
        request: &Req,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }

        response.json::<Resp>().await.map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    /// POST a JSON body where only the response status matters.
    async fn post_for_status<Req>(
        &self,
        endpoint: &'static str,
        request: &Req,
    ) -> Result<(), ApiError>
    where
        Req: Serialize + Sync,
    {
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                endpoint,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }
        Ok(())
    }
}

#[async_trait]
impl NegotiationApi for BackendClient {
    async fn initiate_upload(
        &self,
        request: InitiateUploadRequest,
    ) -> Result<UploadTarget, ApiError> {
        debug!(
            mime_type = %request.mime_type,
            file_size = request.file_size_bytes,
            "initiating upload"
        );
        self.post_json(INITIATE_ENDPOINT, &request).await
    }

    async fn complete_multipart(&self, request: CompleteMultipartRequest) -> Result<(), ApiError> {
        debug!(
            storage_key = %request.storage_key,
            upload_id = %request.upload_id,
            parts = request.parts.len(),
            "completing multipart upload"
        );
        self.post_for_status(COMPLETE_ENDPOINT, &request).await
    }

    async fn abort_multipart(&self, request: AbortMultipartRequest) -> Result<(), ApiError> {
        debug!(
            storage_key = %request.storage_key,
            upload_id = %request.upload_id,
            "aborting multipart upload"
        );
        self.post_for_status(ABORT_ENDPOINT, &request).await
    }

    async fn confirm_upload(
        &self,
        request: ConfirmUploadRequest,
    ) -> Result<ConfirmUploadResponse, ApiError> {
        debug!(storage_key = %request.storage_key, "confirming upload");
        self.post_json(CONFIRM_ENDPOINT, &request).await
    }
}
