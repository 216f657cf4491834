use thiserror::Error;

/// Immich client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to create HTTP client: {0}")]
    Build(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_builder() {
            ClientError::InvalidRequest(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
