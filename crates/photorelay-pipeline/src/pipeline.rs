//! The relay pipeline for one incoming file.
//!
//! access check -> routing -> fetch (retry) -> classify -> dispatch
//! (retry) -> exactly one notification. Each invocation owns its routing
//! decision, staged payload and outcome; only the components themselves are
//! shared between concurrent invocations.

use std::sync::Arc;

use chrono::Utc;
use photorelay_core::classify::content_type_for;
use photorelay_core::error::LogLevel;
use photorelay_core::{
    AccessDecision, AccessGuard, ErrorMetadata, IncomingFile, MetadataClassifier, PipelineError,
    RetryDecision, RetryPolicy, RoutingDecision, TransportRouter, UploadOutcome,
};
use photorelay_immich_client::AssetUpload;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::dispatcher::UploadDispatcher;
use crate::fetcher::{FetchedPayload, FileFetcher};
use crate::metadata::capture_time;
use crate::notifier::ResponseNotifier;

pub struct Pipeline {
    guard: Arc<AccessGuard>,
    router: TransportRouter,
    fetcher: FileFetcher,
    classifier: MetadataClassifier,
    dispatcher: UploadDispatcher,
    notifier: Arc<dyn ResponseNotifier>,
    device_id: String,
}

impl Pipeline {
    pub fn new(
        guard: Arc<AccessGuard>,
        router: TransportRouter,
        fetcher: FileFetcher,
        dispatcher: UploadDispatcher,
        notifier: Arc<dyn ResponseNotifier>,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            guard,
            router,
            fetcher,
            classifier: MetadataClassifier,
            dispatcher,
            notifier,
            device_id: device_id.into(),
        }
    }

    /// Relay `file` and send exactly one notification about the result.
    pub async fn handle(&self, file: IncomingFile, cancel: &CancellationToken) -> UploadOutcome {
        let outcome = self.run(&file, cancel).await;
        self.notifier
            .notify(file.chat_id, &file.display_name(), &outcome)
            .await;
        outcome
    }

    /// Relay `file` without notifying. The result is never `TransientError`.
    pub async fn run(&self, file: &IncomingFile, cancel: &CancellationToken) -> UploadOutcome {
        let span = tracing::info_span!(
            "relay",
            sender_id = file.sender_id,
            file_id = %file.file_reference_id,
        );
        async move {
            let outcome = self.run_inner(file, cancel).await;
            match &outcome {
                UploadOutcome::Success(id) | UploadOutcome::Duplicate(id) => {
                    tracing::info!(outcome = outcome.label(), asset_id = %id, "File relayed")
                }
                UploadOutcome::Rejected(reason) => {
                    tracing::info!(reason = %reason, "File rejected")
                }
                UploadOutcome::TransientError(reason) | UploadOutcome::FatalError(reason) => {
                    tracing::warn!(outcome = outcome.label(), reason = %reason, "File not relayed")
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, file: &IncomingFile, cancel: &CancellationToken) -> UploadOutcome {
        if let AccessDecision::Deny(reason) = self.guard.check(file.sender_id) {
            return UploadOutcome::Rejected(reason);
        }

        let route = match self.router.route(file.declared_size_bytes) {
            Ok(route) => route,
            Err(reason) => return UploadOutcome::Rejected(reason),
        };
        tracing::debug!(
            endpoint = %route.endpoint,
            declared_size = ?file.declared_size_bytes,
            "Routed file"
        );

        let payload = match self.fetch_with_retry(file, route, cancel).await {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        let file_name = payload.original_filename().to_string();
        let classification = self.classifier.classify(
            file.transmission_mode,
            file.mime_hint.as_deref(),
            Some(&file_name),
        );
        let now = Utc::now();
        let created_at = capture_time(payload.path(), &classification, file, now);

        let upload = AssetUpload {
            path: payload.path().to_path_buf(),
            content_type: content_type_for(file.mime_hint.as_deref(), &file_name),
            device_asset_id: format!("{}-{}", file_name, payload.byte_length()),
            file_name,
            byte_length: payload.byte_length(),
            checksum: payload.checksum().to_string(),
            device_id: self.device_id.clone(),
            file_created_at: created_at,
            file_modified_at: now,
            metadata_preserved: classification.metadata_preserved,
        };
        tracing::info!(
            file_name = %upload.file_name,
            byte_length = upload.byte_length,
            kind = ?classification.kind,
            metadata_preserved = classification.metadata_preserved,
            "Uploading to Immich"
        );

        let outcome = self.dispatcher.dispatch(&upload, cancel).await;
        drop(payload);
        outcome
    }

    async fn fetch_with_retry(
        &self,
        file: &IncomingFile,
        route: RoutingDecision,
        cancel: &CancellationToken,
    ) -> Result<FetchedPayload, UploadOutcome> {
        let policy: &RetryPolicy = self.dispatcher.policy();
        let mut attempts_made: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled.into_outcome());
            }

            attempts_made += 1;
            // A mid-stream overflow is recoverable like any other fetch failure.
            let err = match self.fetcher.fetch(file, &route).await {
                Ok(payload) => return Ok(payload),
                Err(err) => PipelineError::from(err),
            };

            log_error(&err, attempts_made);
            if !err.is_recoverable() {
                return Err(err.into_outcome());
            }

            match policy.decide(attempts_made) {
                RetryDecision::GiveUp => return Err(err.into_outcome().demote()),
                RetryDecision::RetryAfter(delay) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(PipelineError::Cancelled.into_outcome()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}

fn log_error(err: &PipelineError, attempt: u32) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error = %err, code, attempt, "Fetch failed"),
        LogLevel::Warn => tracing::warn!(error = %err, code, attempt, "Fetch failed"),
        LogLevel::Error => tracing::error!(error = %err, code, attempt, "Fetch failed"),
    }
}
