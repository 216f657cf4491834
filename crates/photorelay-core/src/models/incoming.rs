use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the sender attached the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmissionMode {
    /// Sent as a photo or video: Telegram re-encoded it and stripped EXIF.
    Compressed,
    /// Sent as a file attachment: bytes are untouched.
    Document,
}

/// Broad media family used for naming and metadata extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

/// A file reference received from the chat transport. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub file_reference_id: String,
    /// Advisory only: some attachments never report a size.
    pub declared_size_bytes: Option<u64>,
    pub mime_hint: Option<String>,
    pub transmission_mode: TransmissionMode,
    pub sender_id: i64,
    pub chat_id: i64,
    pub file_name: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl IncomingFile {
    pub fn new(
        file_reference_id: impl Into<String>,
        sender_id: i64,
        transmission_mode: TransmissionMode,
    ) -> Self {
        Self {
            file_reference_id: file_reference_id.into(),
            declared_size_bytes: None,
            mime_hint: None,
            transmission_mode,
            sender_id,
            chat_id: sender_id,
            file_name: None,
            sent_at: None,
        }
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size_bytes = Some(size);
        self
    }

    pub fn with_mime_hint(mut self, mime: impl Into<String>) -> Self {
        self.mime_hint = Some(mime.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_chat_id(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn with_sent_at(mut self, sent_at: DateTime<Utc>) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    /// Name used for the asset and in replies. Falls back to the file reference.
    pub fn display_name(&self) -> String {
        match &self.file_name {
            Some(name) => name.clone(),
            None => format!("file_{}", self.file_reference_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_chat_to_sender() {
        let file = IncomingFile::new("abc", 42, TransmissionMode::Document).with_declared_size(10);
        assert_eq!(file.chat_id, 42);
        assert_eq!(file.declared_size_bytes, Some(10));
        assert_eq!(file.display_name(), "file_abc");
    }
}
