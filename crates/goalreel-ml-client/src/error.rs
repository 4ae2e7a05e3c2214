//! Text generation client errors.

use thiserror::Error;

pub type GenerateResult<T> = Result<T, GenerateError>;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key not configured (set TWELVELABS_API_KEY)")]
    MissingApiKey,

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Generation service returned {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerateError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerateError::ServiceUnavailable(_) => true,
            GenerateError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
