//! Error type shared by the HTTP client and every service built on it.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not signed in; run `taskdeck login` first")]
    NotAuthenticated,

    #[error("invalid API url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}
