//! End-to-end tests through the real Immich HTTP client against a stub server.
//!
//! Run with: `cargo test -p photorelay-pipeline --test immich_test`

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::immich::{spawn_stub_immich, TEST_API_KEY};
use helpers::{build_pipeline, fast_retry, MemorySource, ALLOWED_SENDER};
use photorelay_core::{IncomingFile, TransmissionMode, UploadOutcome};
use photorelay_immich_client::{ClientError, ImmichClient};
use tokio_util::sync::CancellationToken;

fn client(base_url: &str, api_key: &str) -> Arc<ImmichClient> {
    Arc::new(ImmichClient::new(base_url, api_key, Duration::from_secs(10)).unwrap())
}

#[tokio::test]
async fn test_identical_bytes_uploaded_twice_are_duplicate() {
    let immich = spawn_stub_immich().await;
    let source = MemorySource::new();
    source.insert("first", b"same picture bytes".to_vec());
    source.insert("second", b"same picture bytes".to_vec());
    let t = build_pipeline(
        source,
        client(&immich.base_url, TEST_API_KEY),
        false,
        fast_retry(3),
        Duration::from_secs(10),
    );
    let cancel = CancellationToken::new();

    let first = IncomingFile::new("first", ALLOWED_SENDER, TransmissionMode::Document)
        .with_file_name("IMG_1.jpg");
    let second = IncomingFile::new("second", ALLOWED_SENDER, TransmissionMode::Document)
        .with_file_name("IMG_1 (copy).jpg");

    assert_eq!(
        t.pipeline.handle(first, &cancel).await,
        UploadOutcome::Success("a1".to_string())
    );
    assert_eq!(
        t.pipeline.handle(second, &cancel).await,
        UploadOutcome::Duplicate("a1".to_string())
    );
    assert_eq!(immich.asset_count(), 1);
    assert_eq!(t.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_request_shape() {
    let immich = spawn_stub_immich().await;
    let source = MemorySource::new();
    source.insert("clip", vec![5u8; 300_000]);
    let t = build_pipeline(
        source,
        client(&immich.base_url, TEST_API_KEY),
        false,
        fast_retry(3),
        Duration::from_secs(10),
    );

    let file = IncomingFile::new("clip", ALLOWED_SENDER, TransmissionMode::Compressed)
        .with_file_name("video_AgAD.mp4")
        .with_mime_hint("video/mp4");
    let outcome = t.pipeline.handle(file, &CancellationToken::new()).await;
    assert_eq!(outcome, UploadOutcome::Success("a1".to_string()));

    let received = immich.received();
    assert_eq!(received.len(), 1);
    let upload = &received[0];
    assert_eq!(upload.byte_length, 300_000);
    assert_eq!(upload.file_name.as_deref(), Some("video_AgAD.mp4"));
    assert_eq!(upload.content_type.as_deref(), Some("video/mp4"));
    assert_eq!(upload.fields["deviceAssetId"], "video_AgAD.mp4-300000");
    assert_eq!(upload.fields["deviceId"], "test-device");
    assert_eq!(upload.fields["isFavorite"], "false");
    assert_eq!(upload.fields["visibility"], "timeline");
    assert!(upload.fields["fileCreatedAt"].ends_with('Z'));
    assert_eq!(upload.headers["x-immich-checksum"].len(), 40);
    assert_eq!(upload.headers["x-photorelay-original-metadata"], "false");
}

#[tokio::test]
async fn test_rejected_api_key_is_fatal_without_retry() {
    let immich = spawn_stub_immich().await;
    let source = MemorySource::new();
    source.insert("f", vec![1u8; 64]);
    let t = build_pipeline(
        source,
        client(&immich.base_url, "wrong-key"),
        false,
        fast_retry(3),
        Duration::from_secs(10),
    );

    let file = IncomingFile::new("f", ALLOWED_SENDER, TransmissionMode::Document);
    let outcome = t.pipeline.handle(file, &CancellationToken::new()).await;

    assert!(matches!(outcome, UploadOutcome::FatalError(_)));
    assert_eq!(immich.requests(), 1);
    assert_eq!(t.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_unreachable_immich_is_retried_then_fatal() {
    // Nothing listens on the discard port.
    let source = MemorySource::new();
    source.insert("f", vec![1u8; 64]);
    let t = build_pipeline(
        source,
        client("http://127.0.0.1:9/api", TEST_API_KEY),
        false,
        fast_retry(2),
        Duration::from_secs(10),
    );

    let file = IncomingFile::new("f", ALLOWED_SENDER, TransmissionMode::Document);
    match t.pipeline.handle(file, &CancellationToken::new()).await {
        UploadOutcome::FatalError(reason) => assert!(reason.starts_with("retries exhausted")),
        other => panic!("expected fatal, got {:?}", other),
    }
    assert_eq!(t.staged_files(), 0);
}

#[tokio::test]
async fn test_status_endpoints() {
    let immich = spawn_stub_immich().await;

    let good = client(&immich.base_url, TEST_API_KEY);
    good.ping().await.unwrap();
    let user = good.current_user().await.unwrap();
    assert_eq!(user.name, "Test User");
    assert!(user.is_admin);

    let bad = client(&immich.base_url, "wrong-key");
    let err = bad.current_user().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 401, .. }));
}
