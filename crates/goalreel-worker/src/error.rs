//! Worker error types.

use thiserror::Error;

use goalreel_media::MediaError;
use goalreel_ml_client::GenerateError;
use goalreel_models::PolicyError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Text generation failed: {0}")]
    GenerationFailed(String),

    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Invalid duration policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Generation service error: {0}")]
    Generate(#[from] GenerateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// Check if rerunning the whole job might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Generate(e) => e.is_retryable(),
            WorkerError::Media(MediaError::Timeout(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_cause() {
        let err: WorkerError = MediaError::NoClipsFound("/w/clips".into()).into();
        assert_eq!(err.to_string(), "Media error: No highlight clips found in /w/clips");

        let err: WorkerError = PolicyError::MinExceedsMax { min: 20, max: 10 }.into();
        assert!(err.to_string().contains("min_duration (20)"));
    }

    #[test]
    fn test_retryable() {
        assert!(WorkerError::from(MediaError::Timeout(60)).is_retryable());
        assert!(!WorkerError::generation_failed("no text generated").is_retryable());
        assert!(!WorkerError::from(GenerateError::MissingApiKey).is_retryable());
    }
}
