//! Domain methods for the Immich client.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{error_for_status, ClientError, ClientResult, ImmichClient};

const CHECKSUM_HEADER: &str = "x-immich-checksum";
const ORIGINAL_METADATA_HEADER: &str = "x-photorelay-original-metadata";
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// One asset upload. The file is streamed from `path` on every attempt.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
    pub byte_length: u64,
    /// SHA-1 hex digest; lets Immich answer "duplicate" before reading the body.
    pub checksum: String,
    pub device_asset_id: String,
    pub device_id: String,
    pub file_created_at: DateTime<Utc>,
    pub file_modified_at: DateTime<Utc>,
    pub metadata_preserved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Created,
    Replaced,
    Duplicate,
    #[serde(other)]
    Unknown,
}

/// Body of `POST /assets`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetUploadResponse {
    pub id: String,
    pub status: AssetStatus,
}

/// Body of `GET /users/me` (only the fields the bot shows).
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub name: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// ISO 8601 with millisecond precision and a `Z` suffix.
pub fn format_iso_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

impl ImmichClient {
    /// Upload one asset as multipart form data.
    pub async fn upload_asset(&self, upload: &AssetUpload) -> ClientResult<AssetUploadResponse> {
        let file = tokio::fs::File::open(&upload.path).await?;

        let part = Part::stream_with_length(file, upload.byte_length)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| ClientError::InvalidRequest(format!("content type: {}", e)))?;

        let form = Form::new()
            .part("assetData", part)
            .text("deviceAssetId", upload.device_asset_id.clone())
            .text("deviceId", upload.device_id.clone())
            .text("fileCreatedAt", format_iso_date(&upload.file_created_at))
            .text("fileModifiedAt", format_iso_date(&upload.file_modified_at))
            .text("isFavorite", "false")
            .text("visibility", "timeline");

        let url = self.build_url("/assets");
        let request = self
            .apply_auth(self.client().post(&url))
            .header(CHECKSUM_HEADER, upload.checksum.as_str())
            .header(
                ORIGINAL_METADATA_HEADER,
                if upload.metadata_preserved { "true" } else { "false" },
            )
            .multipart(form);

        let start = std::time::Instant::now();
        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        let response = error_for_status(response).await?;

        let body: AssetUploadResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        tracing::debug!(
            asset_id = %body.id,
            status = ?body.status,
            size_bytes = upload.byte_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Immich upload answered"
        );

        Ok(body)
    }

    /// `GET /server/ping`; succeeds only on HTTP 200.
    pub async fn ping(&self) -> ClientResult<()> {
        let url = self.build_url("/server/ping");
        let response = self
            .apply_auth(self.client().get(&url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        error_for_status(response).await?;
        Ok(())
    }

    /// Account the API key belongs to.
    pub async fn current_user(&self) -> ClientResult<UserResponse> {
        self.get("/users/me", STATUS_TIMEOUT).await
    }
}
