use std::sync::Arc;

use chrono::{DateTime, Utc};
use photorelay_core::{IncomingFile, TransmissionMode};
use teloxide::prelude::*;

use super::sender_id;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Photo,
    Video,
}

/// The file part of a Telegram message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_id: String,
    pub unique_id: String,
    /// 0 when Telegram did not report a size.
    pub size: u32,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl Attachment {
    /// Documents arrive byte for byte; photos and videos are re-encoded.
    pub fn transmission_mode(&self) -> TransmissionMode {
        match self.kind {
            AttachmentKind::Document => TransmissionMode::Document,
            AttachmentKind::Photo | AttachmentKind::Video => TransmissionMode::Compressed,
        }
    }

    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| default_file_name(self.kind, &self.unique_id))
    }

    pub fn into_incoming(
        self,
        sender_id: i64,
        chat_id: i64,
        sent_at: DateTime<Utc>,
    ) -> IncomingFile {
        let mut file = IncomingFile::new(self.file_id.clone(), sender_id, self.transmission_mode())
            .with_chat_id(chat_id)
            .with_file_name(self.file_name())
            .with_sent_at(sent_at);
        if self.size > 0 {
            file = file.with_declared_size(u64::from(self.size));
        }
        if let Some(mime) = self.mime_type {
            file = file.with_mime_hint(mime);
        }
        file
    }
}

pub fn default_file_name(kind: AttachmentKind, unique_id: &str) -> String {
    match kind {
        AttachmentKind::Photo => format!("photo_{}.jpg", unique_id),
        AttachmentKind::Video => format!("video_{}.mp4", unique_id),
        AttachmentKind::Document => format!("document_{}", unique_id),
    }
}

/// Document first, then the largest photo size, then video.
pub fn attachment(msg: &Message) -> Option<Attachment> {
    if let Some(doc) = msg.document() {
        return Some(Attachment {
            kind: AttachmentKind::Document,
            file_id: doc.file.id.to_string(),
            unique_id: doc.file.unique_id.to_string(),
            size: doc.file.size,
            file_name: doc.file_name.clone(),
            mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
        });
    }

    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(Attachment {
            kind: AttachmentKind::Photo,
            file_id: photo.file.id.to_string(),
            unique_id: photo.file.unique_id.to_string(),
            size: photo.file.size,
            file_name: None,
            mime_type: Some("image/jpeg".to_string()),
        });
    }

    msg.video().map(|video| Attachment {
        kind: AttachmentKind::Video,
        file_id: video.file.id.to_string(),
        unique_id: video.file.unique_id.to_string(),
        size: video.file.size,
        file_name: video.file_name.clone(),
        mime_type: video.mime_type.as_ref().map(|m| m.to_string()),
    })
}

pub fn has_attachment(msg: &Message) -> bool {
    attachment(msg).is_some()
}

/// Start relaying the attached file. Returns immediately; the pipeline
/// reports its outcome to the chat itself.
pub async fn handle_media(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(attachment) = attachment(&msg) else {
        return Ok(());
    };

    let file = attachment.into_incoming(sender_id(&msg), msg.chat.id.0, msg.date);
    tracing::info!(
        sender_id = file.sender_id,
        file_id = %file.file_reference_id,
        file_name = file.file_name.as_deref().unwrap_or_default(),
        mode = ?file.transmission_mode,
        declared_size = ?file.declared_size_bytes,
        "Received file"
    );

    tokio::spawn(async move {
        state.pipeline.handle(file, &state.shutdown).await;
    });
    Ok(())
}
