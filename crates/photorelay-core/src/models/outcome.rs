use std::fmt;

use crate::constants::{HOSTED_MAX_FILE_SIZE, LOCAL_MAX_FILE_SIZE};

/// Policy reasons for refusing a file. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAuthorized,
    ExceedsHostedLimit,
    ExceedsHardLimit,
}

impl RejectReason {
    /// Size limit behind a size rejection, in bytes.
    pub fn size_limit(&self) -> Option<u64> {
        match self {
            RejectReason::NotAuthorized => None,
            RejectReason::ExceedsHostedLimit => Some(HOSTED_MAX_FILE_SIZE),
            RejectReason::ExceedsHardLimit => Some(LOCAL_MAX_FILE_SIZE),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAuthorized => write!(f, "not authorized"),
            RejectReason::ExceedsHostedLimit => write!(f, "exceeds 20MB, no local endpoint"),
            RejectReason::ExceedsHardLimit => write!(f, "exceeds 2GB hard limit"),
        }
    }
}

/// Terminal (or per-attempt) result of relaying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(String),
    /// Immich already holds byte-identical content under this id.
    Duplicate(String),
    Rejected(RejectReason),
    TransientError(String),
    FatalError(String),
}

impl UploadOutcome {
    pub fn is_transient(&self) -> bool {
        matches!(self, UploadOutcome::TransientError(_))
    }

    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            UploadOutcome::Success(_) => "success",
            UploadOutcome::Duplicate(_) => "duplicate",
            UploadOutcome::Rejected(_) => "rejected",
            UploadOutcome::TransientError(_) => "transient_error",
            UploadOutcome::FatalError(_) => "fatal_error",
        }
    }

    /// Turn a transient failure into a fatal one once retries are spent.
    pub fn demote(self) -> Self {
        match self {
            UploadOutcome::TransientError(reason) => {
                UploadOutcome::FatalError(format!("retries exhausted: {}", reason))
            }
            other => other,
        }
    }
}
