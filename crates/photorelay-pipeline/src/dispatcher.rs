//! Upload dispatch with bounded retry.
//!
//! One attempt is one `POST /assets`. The HTTP result is mapped onto the
//! outcome vocabulary: 2xx is success or duplicate, 4xx is fatal, 5xx,
//! network errors and timeouts are transient. Transient attempts are retried
//! under the configured `RetryPolicy` and demoted to fatal once it gives up.
//! Every retry streams the same staged file again and carries the same
//! checksum, so an attempt that landed server-side comes back as a duplicate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use photorelay_core::{PipelineError, RetryDecision, RetryPolicy, UploadOutcome};
use photorelay_immich_client::{
    AssetStatus, AssetUpload, AssetUploadResponse, ClientError, ClientResult, ImmichClient,
};
use tokio_util::sync::CancellationToken;

/// Where assets are uploaded.
#[async_trait]
pub trait AssetSink: Send + Sync {
    async fn upload(&self, upload: &AssetUpload) -> ClientResult<AssetUploadResponse>;
}

#[async_trait]
impl AssetSink for ImmichClient {
    async fn upload(&self, upload: &AssetUpload) -> ClientResult<AssetUploadResponse> {
        self.upload_asset(upload).await
    }
}

/// Map a client error onto the pipeline taxonomy.
pub fn classify_client_error(err: ClientError, timeout: Duration) -> PipelineError {
    match err {
        ClientError::Status { status, body } if status >= 500 => {
            PipelineError::UploadUnavailable { status, body }
        }
        ClientError::Status { status, body } => PipelineError::UploadRejected { status, body },
        ClientError::Timeout => PipelineError::UploadTimeout(timeout),
        ClientError::Network(msg) => PipelineError::UploadNetwork(msg),
        ClientError::Decode(msg) => PipelineError::UploadBadResponse(msg),
        ClientError::InvalidRequest(msg) | ClientError::Build(msg) => {
            PipelineError::UploadInvalidRequest(msg)
        }
        ClientError::Io(e) => PipelineError::Io(e),
    }
}

pub struct UploadDispatcher {
    sink: Arc<dyn AssetSink>,
    policy: RetryPolicy,
    timeout: Duration,
}

impl UploadDispatcher {
    pub fn new(sink: Arc<dyn AssetSink>, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            sink,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Exactly one upload attempt.
    pub async fn attempt(&self, upload: &AssetUpload) -> UploadOutcome {
        let result = match tokio::time::timeout(self.timeout, self.sink.upload(upload)).await {
            Ok(result) => result.map_err(|e| classify_client_error(e, self.timeout)),
            Err(_) => Err(PipelineError::UploadTimeout(self.timeout)),
        };

        match result {
            Ok(response) if response.status == AssetStatus::Duplicate => {
                UploadOutcome::Duplicate(response.id)
            }
            Ok(response) => UploadOutcome::Success(response.id),
            Err(err) => err.into_outcome(),
        }
    }

    /// Upload with retries. Never returns `TransientError`.
    pub async fn dispatch(
        &self,
        upload: &AssetUpload,
        cancel: &CancellationToken,
    ) -> UploadOutcome {
        let mut attempts_made: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return PipelineError::Cancelled.into_outcome();
            }

            attempts_made += 1;
            let outcome = self.attempt(upload).await;
            tracing::debug!(
                file_name = %upload.file_name,
                attempt = attempts_made,
                outcome = outcome.label(),
                "Upload attempt finished"
            );

            if !outcome.is_transient() {
                return outcome;
            }

            match self.policy.decide(attempts_made) {
                RetryDecision::GiveUp => {
                    tracing::warn!(
                        file_name = %upload.file_name,
                        attempts = attempts_made,
                        outcome = ?outcome,
                        "Upload retries exhausted"
                    );
                    return outcome.demote();
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        file_name = %upload.file_name,
                        attempt = attempts_made,
                        delay_ms = delay.as_millis() as u64,
                        outcome = ?outcome,
                        "Upload failed, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return PipelineError::Cancelled.into_outcome(),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
