//! Metadata classification.
//!
//! Files sent as photos or videos are re-encoded by Telegram, which drops EXIF
//! and the original resolution. Files sent as documents arrive byte for byte.
//! The classifier records which case applies so the upload can be tagged and
//! the capture date taken from the right place.

use tracing::debug;

use crate::constants::{SUPPORTED_IMAGE_EXTENSIONS, SUPPORTED_VIDEO_EXTENSIONS};
use crate::models::{MediaKind, TransmissionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: MediaKind,
    /// True when the bytes still carry the sender's original metadata.
    pub metadata_preserved: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataClassifier;

impl MetadataClassifier {
    pub fn classify(
        &self,
        mode: TransmissionMode,
        mime_hint: Option<&str>,
        file_name: Option<&str>,
    ) -> Classification {
        let kind = kind_from_mime(mime_hint)
            .or_else(|| file_name.and_then(kind_from_extension))
            .unwrap_or(match mode {
                // Telegram photos are always JPEG.
                TransmissionMode::Compressed => MediaKind::Image,
                TransmissionMode::Document => MediaKind::Document,
            });

        let classification = Classification {
            kind,
            metadata_preserved: mode == TransmissionMode::Document,
        };
        debug!(
            ?mode,
            ?kind,
            metadata_preserved = classification.metadata_preserved,
            "Classified incoming file"
        );
        classification
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; q=1" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

fn kind_from_mime(mime: Option<&str>) -> Option<MediaKind> {
    let mime = normalize_mime_type(mime?);
    if mime.starts_with("image/") {
        Some(MediaKind::Image)
    } else if mime.starts_with("video/") {
        Some(MediaKind::Video)
    } else {
        None
    }
}

fn kind_from_extension(file_name: &str) -> Option<MediaKind> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Best-effort content type for the upload part.
pub fn content_type_for(mime_hint: Option<&str>, file_name: &str) -> String {
    if let Some(mime) = mime_hint {
        let normalized = normalize_mime_type(mime);
        if normalized.contains('/') {
            return normalized;
        }
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "webp" => "image/webp",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "3gp" => "video/3gpp",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_preserves_metadata() {
        let c = MetadataClassifier.classify(
            TransmissionMode::Document,
            Some("image/jpeg"),
            Some("IMG_0001.JPG"),
        );
        assert_eq!(c.kind, MediaKind::Image);
        assert!(c.metadata_preserved);
    }

    #[test]
    fn test_compressed_photo_lost_metadata() {
        let c = MetadataClassifier.classify(TransmissionMode::Compressed, None, None);
        assert_eq!(c.kind, MediaKind::Image);
        assert!(!c.metadata_preserved);
    }

    #[test]
    fn test_kind_from_extension_when_mime_missing() {
        let c = MetadataClassifier.classify(TransmissionMode::Document, None, Some("clip.MOV"));
        assert_eq!(c.kind, MediaKind::Video);
        let c = MetadataClassifier.classify(
            TransmissionMode::Document,
            Some("application/pdf"),
            Some("scan.pdf"),
        );
        assert_eq!(c.kind, MediaKind::Document);
    }

    #[test]
    fn test_content_type_resolution() {
        assert_eq!(
            content_type_for(Some("image/HEIC; x=1"), "a.heic"),
            "image/heic"
        );
        assert_eq!(content_type_for(None, "movie.mov"), "video/quicktime");
        assert_eq!(content_type_for(None, "noext"), "application/octet-stream");
    }
}
