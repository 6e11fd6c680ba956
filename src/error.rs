use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("config error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
