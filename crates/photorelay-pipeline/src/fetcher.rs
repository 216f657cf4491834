//! File fetching.
//!
//! A `FileSource` opens a byte stream for a Telegram file reference on one
//! endpoint. The `FileFetcher` drains that stream into a temporary file,
//! counting and hashing as it goes, and enforces the size ceiling of the
//! routing decision on the bytes actually received. The temporary file is a
//! `TempPath` owned by the returned `FetchedPayload`; any early return drops
//! it and removes the file.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use photorelay_core::{Endpoint, IncomingFile, PipelineError, RoutingDecision};
use sha1::{Digest, Sha1};
use tempfile::TempPath;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("file reference not found: {0}")]
    NotFound(String),

    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unreachable(msg) => PipelineError::FetchUnreachable(msg),
            FetchError::NotFound(msg) => PipelineError::FetchInvalidReference(msg),
            FetchError::TooLarge { limit } => PipelineError::FetchTooLarge { limit },
            FetchError::Timeout(after) => PipelineError::FetchTimeout(after),
            FetchError::Io(e) => PipelineError::Io(e),
        }
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = FetchResult<Bytes>> + Send>>;

/// An opened remote file.
pub struct RemoteFile {
    /// Size reported by the endpoint when resolving the reference, if any.
    pub reported_size: Option<u64>,
    pub stream: ByteStream,
}

impl RemoteFile {
    pub fn new(reported_size: Option<u64>, stream: ByteStream) -> Self {
        Self {
            reported_size,
            stream,
        }
    }
}

/// Where file bytes come from.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Resolve `file_reference_id` on `endpoint` and open its byte stream.
    async fn open(&self, endpoint: Endpoint, file_reference_id: &str) -> FetchResult<RemoteFile>;
}

/// Bytes of one file staged on local disk. Dropping it deletes the file.
#[derive(Debug)]
pub struct FetchedPayload {
    path: TempPath,
    byte_length: u64,
    original_filename: String,
    checksum: String,
}

impl FetchedPayload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes actually received.
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Lowercase hex SHA-1 of the content.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

pub struct FileFetcher {
    source: Arc<dyn FileSource>,
    temp_dir: PathBuf,
    timeout: Duration,
}

impl FileFetcher {
    pub fn new(
        source: Arc<dyn FileSource>,
        temp_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            temp_dir: temp_dir.into(),
            timeout,
        }
    }

    /// Stream `file` from the routed endpoint into a temporary file.
    pub async fn fetch(
        &self,
        file: &IncomingFile,
        route: &RoutingDecision,
    ) -> FetchResult<FetchedPayload> {
        match tokio::time::timeout(self.timeout, self.fetch_inner(file, route)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn fetch_inner(
        &self,
        file: &IncomingFile,
        route: &RoutingDecision,
    ) -> FetchResult<FetchedPayload> {
        let limit = route.max_size_bytes;
        let remote = self
            .source
            .open(route.endpoint, &file.file_reference_id)
            .await?;

        if matches!(remote.reported_size, Some(size) if size > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let (std_file, path) = tempfile::Builder::new()
            .prefix("photorelay-")
            .tempfile_in(&self.temp_dir)?
            .into_parts();
        let mut out = tokio::fs::File::from_std(std_file);

        let mut stream = remote.stream;
        let mut hasher = Sha1::new();
        let mut byte_length: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            byte_length += chunk.len() as u64;
            if byte_length > limit {
                return Err(FetchError::TooLarge { limit });
            }
            hasher.update(&chunk);
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        drop(out);

        let payload = FetchedPayload {
            path,
            byte_length,
            original_filename: file.display_name(),
            checksum: hex::encode(hasher.finalize()),
        };

        tracing::debug!(
            file_id = %file.file_reference_id,
            endpoint = %route.endpoint,
            byte_length,
            declared_size = ?file.declared_size_bytes,
            "File fetched"
        );

        Ok(payload)
    }
}
