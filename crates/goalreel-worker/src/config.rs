//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use goalreel_ml_client::{GenerateClientConfig, DEFAULT_BASE_URL, DEFAULT_PROMPT, DEFAULT_TEMPERATURE};
use goalreel_models::{
    CaptionStyle, DurationPolicy, EncodingConfig, DEFAULT_FALLBACK_TITLE, DEFAULT_MAX_DURATION,
    DEFAULT_MIN_DURATION, DEFAULT_TARGET_DURATION,
};

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Clip duration thresholds
    pub policy: DurationPolicy,
    /// Root for per-job working directories
    pub work_dir: PathBuf,
    /// Keep extracted clips after a successful assembly
    pub keep_clips: bool,
    /// Per-invocation FFmpeg timeout
    pub ffmpeg_timeout_secs: Option<u64>,
    /// Caption overlay style
    pub caption: CaptionStyle,
    /// Caption for goals the generated text has no title for
    pub fallback_title: String,
    /// Encoder settings for clips and the final highlight
    pub encoding: EncodingConfig,
    /// Generation service connection
    pub generation: GenerateClientConfig,
    /// Prompt sent with every generation request
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            policy: DurationPolicy::default(),
            work_dir: PathBuf::from("/tmp/goalreel"),
            keep_clips: false,
            ffmpeg_timeout_secs: None,
            caption: CaptionStyle::default(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            encoding: EncodingConfig::default(),
            generation: GenerateClientConfig::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// Unparseable numbers fall back to their defaults; an inconsistent
    /// duration policy is an error.
    pub fn from_vars<F>(var: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let policy = DurationPolicy::new(
            parse_var(&var, "GOALREEL_MIN_DURATION").unwrap_or(DEFAULT_MIN_DURATION),
            parse_var(&var, "GOALREEL_MAX_DURATION").unwrap_or(DEFAULT_MAX_DURATION),
            parse_var(&var, "GOALREEL_TARGET_DURATION").unwrap_or(DEFAULT_TARGET_DURATION),
        )?;

        let mut caption = CaptionStyle::default();
        if let Some(size) = parse_var(&var, "GOALREEL_CAPTION_FONT_SIZE") {
            if size == 0 {
                return Err(WorkerError::config_error("GOALREEL_CAPTION_FONT_SIZE must be positive"));
            }
            caption = caption.with_font_size(size);
        }
        if let Some(font) = var("GOALREEL_CAPTION_FONT_FILE").filter(|s| !s.trim().is_empty()) {
            caption = caption.with_font_file(font);
        }

        let defaults = GenerateClientConfig::default();
        let generation = GenerateClientConfig {
            base_url: var("TWELVELABS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: var("TWELVELABS_API_KEY").filter(|k| !k.trim().is_empty()),
            timeout: parse_var(&var, "TWELVELABS_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: parse_var(&var, "TWELVELABS_RETRIES").unwrap_or(defaults.max_retries),
        };

        Ok(Self {
            policy,
            work_dir: var("GOALREEL_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp/goalreel")),
            keep_clips: var("GOALREEL_KEEP_CLIPS").map(|v| is_truthy(&v)).unwrap_or(false),
            ffmpeg_timeout_secs: parse_var(&var, "GOALREEL_FFMPEG_TIMEOUT_SECS").filter(|secs| *secs > 0),
            caption,
            fallback_title: var("GOALREEL_FALLBACK_TITLE")
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FALLBACK_TITLE.to_string()),
            encoding: EncodingConfig::default(),
            generation,
            prompt: var("GOALREEL_PROMPT")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            temperature: parse_var(&var, "GOALREEL_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE),
        })
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)?.trim().parse().ok()
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = WorkerConfig::from_vars(lookup(&[])).unwrap();
        assert_eq!(config.policy, DurationPolicy::default());
        assert_eq!(config.work_dir, PathBuf::from("/tmp/goalreel"));
        assert!(!config.keep_clips);
        assert_eq!(config.caption.font_size, 48);
        assert_eq!(config.fallback_title, "Goal Highlight");
        assert_eq!(config.generation.base_url, DEFAULT_BASE_URL);
        assert!(config.generation.api_key.is_none());
        assert!((config.temperature - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = WorkerConfig::from_vars(lookup(&[
            ("GOALREEL_MIN_DURATION", "10"),
            ("GOALREEL_MAX_DURATION", "30"),
            ("GOALREEL_TARGET_DURATION", "20"),
            ("GOALREEL_WORK_DIR", "/data/jobs"),
            ("GOALREEL_KEEP_CLIPS", "yes"),
            ("GOALREEL_FFMPEG_TIMEOUT_SECS", "600"),
            ("GOALREEL_CAPTION_FONT_FILE", "/fonts/emoji.ttf"),
            ("GOALREEL_FALLBACK_TITLE", "GOAL!"),
            ("TWELVELABS_API_KEY", "tlk_123"),
        ]))
        .unwrap();

        assert_eq!(config.policy, DurationPolicy::new(10, 30, 20).unwrap());
        assert_eq!(config.work_dir, PathBuf::from("/data/jobs"));
        assert!(config.keep_clips);
        assert_eq!(config.ffmpeg_timeout_secs, Some(600));
        assert_eq!(config.caption.font_file, Some(PathBuf::from("/fonts/emoji.ttf")));
        assert_eq!(config.fallback_title, "GOAL!");
        assert_eq!(config.generation.api_key.as_deref(), Some("tlk_123"));
    }

    #[test]
    fn test_generation_service_settings() {
        let config = WorkerConfig::from_vars(lookup(&[
            ("TWELVELABS_BASE_URL", "http://localhost:9000/v1"),
            ("TWELVELABS_API_KEY", "  "),
            ("TWELVELABS_TIMEOUT_SECS", "45"),
            ("TWELVELABS_RETRIES", "5"),
        ]))
        .unwrap();

        assert_eq!(config.generation.base_url, "http://localhost:9000/v1");
        assert!(config.generation.api_key.is_none());
        assert_eq!(config.generation.timeout, Duration::from_secs(45));
        assert_eq!(config.generation.max_retries, 5);

        let config = WorkerConfig::from_vars(lookup(&[("TWELVELABS_RETRIES", "many")])).unwrap();
        assert_eq!(config.generation.max_retries, GenerateClientConfig::default().max_retries);
        assert_eq!(config.generation.timeout, GenerateClientConfig::default().timeout);
    }

    #[test]
    fn test_inconsistent_policy_is_rejected() {
        let result = WorkerConfig::from_vars(lookup(&[("GOALREEL_MIN_DURATION", "20")]));
        assert!(matches!(result, Err(WorkerError::Policy(_))));
    }

    #[test]
    fn test_garbage_numbers_fall_back() {
        let config = WorkerConfig::from_vars(lookup(&[
            ("GOALREEL_MAX_DURATION", "fifteen"),
            ("GOALREEL_FFMPEG_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.policy.max_duration, 15);
        assert_eq!(config.ffmpeg_timeout_secs, None);
    }
}
