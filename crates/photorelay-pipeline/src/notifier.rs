//! Outcome notification.

use async_trait::async_trait;
use photorelay_core::{RejectReason, UploadOutcome};

/// Delivers the terminal outcome of one file to its sender.
#[async_trait]
pub trait ResponseNotifier: Send + Sync {
    async fn notify(&self, chat_id: i64, file_name: &str, outcome: &UploadOutcome);
}

/// Text shown to the sender. Error details are never included; they are logged.
pub fn render_outcome(file_name: &str, outcome: &UploadOutcome) -> String {
    match outcome {
        UploadOutcome::Success(_) => format!("✅ File {} uploaded successfully!", file_name),
        UploadOutcome::Duplicate(_) => format!("ℹ️ File {} already exists in Immich.", file_name),
        UploadOutcome::Rejected(RejectReason::NotAuthorized) => {
            "❌ You are not authorized to use this bot.".to_string()
        }
        UploadOutcome::Rejected(reason) => {
            let limit_mb = reason.size_limit().unwrap_or(0) / 1024 / 1024;
            format!("❌ File is too big. Maximum size is {} MB.", limit_mb)
        }
        UploadOutcome::TransientError(_) => format!(
            "⚠️ Temporary problem uploading {}. Please try again later.",
            file_name
        ),
        UploadOutcome::FatalError(_) => format!(
            "❌ Failed to upload {}. Please try again later.",
            file_name
        ),
    }
}
