//! Shared constants.

/// Largest file the hosted Bot API will hand out through `getFile`.
pub const HOSTED_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Protocol cap of a self-hosted Bot API server.
pub const LOCAL_MAX_FILE_SIZE: u64 = 2000 * 1024 * 1024;

/// Version reported by `/version` and the startup message.
pub const BOT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BOT_NAME: &str = "Telegram to Immich Bot";

/// `deviceId` form field sent with every asset.
pub const DEFAULT_DEVICE_ID: &str = "telegram-bot-device";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "heic", "heif", "webp",
];

pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v", "3gp"];

/// Human readable list shown by `/files`.
pub const SUPPORTED_FILE_TYPES: &str = "Images: JPG, PNG, GIF, BMP, TIFF, HEIC, WEBP\n\
     Videos: MP4, MOV, AVI, MKV, WEBM, M4V, 3GP\n\
     Send as a file (document) to keep the original quality and metadata.";
