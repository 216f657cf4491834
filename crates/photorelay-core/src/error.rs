//! Error types module
//!
//! `PipelineError` is the unified failure of one relay invocation. Every
//! variant self-describes through `ErrorMetadata` whether it may be retried
//! and how loudly it should be logged, so the pipeline can turn any failure
//! into an `UploadOutcome` without matching on error strings.

use std::time::Duration;

use crate::models::UploadOutcome;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected failures such as an expired file reference
    Debug,
    /// Recoverable infrastructure trouble
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata describing how an error is handled and presented
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FETCH_UNREACHABLE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is transient and may be retried
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("transport endpoint unreachable: {0}")]
    FetchUnreachable(String),

    #[error("file reference invalid or expired: {0}")]
    FetchInvalidReference(String),

    #[error("file exceeds the {limit} byte limit of the selected endpoint")]
    FetchTooLarge { limit: u64 },

    #[error("fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("storage API rejected the upload (HTTP {status}): {body}")]
    UploadRejected { status: u16, body: String },

    #[error("storage API unavailable (HTTP {status}): {body}")]
    UploadUnavailable { status: u16, body: String },

    #[error("upload timed out after {0:?}")]
    UploadTimeout(Duration),

    #[error("network error talking to storage API: {0}")]
    UploadNetwork(String),

    #[error("unexpected storage API response: {0}")]
    UploadBadResponse(String),

    #[error("could not build upload request: {0}")]
    UploadInvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

/// Static metadata per variant: (error_code, recoverable, log_level).
fn static_metadata(err: &PipelineError) -> (&'static str, bool, LogLevel) {
    match err {
        PipelineError::FetchUnreachable(_) => ("FETCH_UNREACHABLE", true, LogLevel::Warn),
        PipelineError::FetchInvalidReference(_) => {
            ("FETCH_INVALID_REFERENCE", false, LogLevel::Debug)
        }
        PipelineError::FetchTooLarge { .. } => ("FETCH_TOO_LARGE", true, LogLevel::Warn),
        PipelineError::FetchTimeout(_) => ("FETCH_TIMEOUT", true, LogLevel::Warn),
        PipelineError::UploadRejected { .. } => ("UPLOAD_REJECTED", false, LogLevel::Error),
        PipelineError::UploadUnavailable { .. } => ("UPLOAD_UNAVAILABLE", true, LogLevel::Warn),
        PipelineError::UploadTimeout(_) => ("UPLOAD_TIMEOUT", true, LogLevel::Warn),
        PipelineError::UploadNetwork(_) => ("UPLOAD_NETWORK", true, LogLevel::Warn),
        PipelineError::UploadBadResponse(_) => ("UPLOAD_BAD_RESPONSE", false, LogLevel::Error),
        PipelineError::UploadInvalidRequest(_) => {
            ("UPLOAD_INVALID_REQUEST", false, LogLevel::Error)
        }
        PipelineError::Io(_) => ("IO_ERROR", false, LogLevel::Error),
        PipelineError::Cancelled => ("CANCELLED", false, LogLevel::Debug),
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).2
    }
}

impl PipelineError {
    /// Classify a single attempt: recoverable errors are transient, the rest fatal.
    pub fn into_outcome(self) -> UploadOutcome {
        if self.is_recoverable() {
            UploadOutcome::TransientError(self.to_string())
        } else {
            UploadOutcome::FatalError(self.to_string())
        }
    }
}
