use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service account token: {0}")]
    Auth(String),

    #[error("Sheet \"{0}\" not found")]
    SheetNotFound(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GoogleError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GoogleError::Status { status, .. } => Some(*status),
            GoogleError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GoogleError>;
