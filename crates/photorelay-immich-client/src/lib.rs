//! HTTP client for the Immich API.
//!
//! Provides a minimal client authenticated with `x-api-key`, generic GET
//! helpers and the domain calls the relay needs (asset upload, server ping,
//! current user). Errors keep the HTTP status so callers can tell a bad
//! request from an unavailable server.

pub mod api;
mod error;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

pub use api::{AssetStatus, AssetUpload, AssetUploadResponse, UserResponse};
pub use error::{ClientError, ClientResult};

const API_KEY_HEADER: &str = "x-api-key";

/// HTTP client for the Immich API.
#[derive(Clone, Debug)]
pub struct ImmichClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ImmichClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://immich:2283/api`.
    /// `timeout` bounds every request made through this client.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(API_KEY_HEADER, self.api_key.as_str())
    }

    /// GET request with an explicit timeout. Deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> ClientResult<T> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.get(&url)).timeout(timeout);

        let response = request.send().await.map_err(ClientError::from_reqwest)?;
        let response = error_for_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Raw client for custom requests. Caller must apply auth.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Turn a non-2xx response into `ClientError::Status`, keeping the body for logs.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client =
            ImmichClient::new("http://immich:2283/api/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://immich:2283/api");
        assert_eq!(client.build_url("/assets"), "http://immich:2283/api/assets");
    }
}
