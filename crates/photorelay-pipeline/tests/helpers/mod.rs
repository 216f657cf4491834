//! Test helpers: in-memory Telegram source, scripted Immich sinks and a
//! recording notifier wired into a real `Pipeline`.
//!
//! Run from workspace root: `cargo test -p photorelay-pipeline`.

#![allow(dead_code)]

pub mod immich;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use photorelay_core::{AccessGuard, Endpoint, RetryPolicy, TransportRouter, UploadOutcome};
use photorelay_immich_client::{AssetStatus, AssetUpload, AssetUploadResponse, ClientResult};
use photorelay_pipeline::{
    AssetSink, FetchError, FetchResult, FileFetcher, FileSource, Pipeline, RemoteFile,
    ResponseNotifier, UploadDispatcher,
};
use tempfile::TempDir;

pub const ALLOWED_SENDER: i64 = 42;
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Telegram stand-in: serves registered files in fixed-size chunks and
/// records which endpoint each open went to.
#[derive(Default)]
pub struct MemorySource {
    files: Mutex<HashMap<String, Bytes>>,
    opens: Mutex<Vec<Endpoint>>,
}

impl MemorySource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, file_id: &str, content: impl Into<Bytes>) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), content.into());
    }

    pub fn opens(&self) -> Vec<Endpoint> {
        self.opens.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSource for MemorySource {
    async fn open(&self, endpoint: Endpoint, file_reference_id: &str) -> FetchResult<RemoteFile> {
        self.opens.lock().unwrap().push(endpoint);
        let content = self
            .files
            .lock()
            .unwrap()
            .get(file_reference_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(file_reference_id.to_string()))?;

        let chunks: Vec<FetchResult<Bytes>> = (0..content.len())
            .step_by(CHUNK_SIZE)
            .map(|start| Ok(content.slice(start..(start + CHUNK_SIZE).min(content.len()))))
            .collect();
        Ok(RemoteFile::new(None, Box::pin(futures::stream::iter(chunks))))
    }
}

/// Immich stand-in that answers every upload with a fresh id, after an
/// optional delay. Records what it was sent.
pub struct CountingSink {
    calls: AtomicU32,
    delay: Duration,
    uploads: Mutex<Vec<AssetUpload>>,
}

impl CountingSink {
    pub fn new() -> Arc<Self> {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            delay,
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<AssetUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetSink for CountingSink {
    async fn upload(&self, upload: &AssetUpload) -> ClientResult<AssetUploadResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.uploads.lock().unwrap().push(upload.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(AssetUploadResponse {
            id: format!("a{}", n),
            status: AssetStatus::Created,
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String, UploadOutcome)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(i64, String, UploadOutcome)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseNotifier for RecordingNotifier {
    async fn notify(&self, chat_id: i64, file_name: &str, outcome: &UploadOutcome) {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id, file_name.to_string(), outcome.clone()));
    }
}

pub struct TestPipeline {
    pub pipeline: Pipeline,
    pub notifier: Arc<RecordingNotifier>,
    pub temp_dir: TempDir,
}

impl TestPipeline {
    /// Number of staged files still on disk.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path()).unwrap().count()
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_attempts,
        Duration::from_millis(1),
        Duration::from_millis(5),
    )
}

/// Pipeline over `source` and `sink` allowing only `ALLOWED_SENDER`.
pub fn build_pipeline(
    source: Arc<dyn FileSource>,
    sink: Arc<dyn AssetSink>,
    local_available: bool,
    policy: RetryPolicy,
    upload_timeout: Duration,
) -> TestPipeline {
    let temp_dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = Pipeline::new(
        Arc::new(AccessGuard::new([ALLOWED_SENDER])),
        TransportRouter::new(local_available),
        FileFetcher::new(source, temp_dir.path(), Duration::from_secs(30)),
        UploadDispatcher::new(sink, policy, upload_timeout),
        notifier.clone(),
        "test-device",
    );

    TestPipeline {
        pipeline,
        notifier,
        temp_dir,
    }
}
