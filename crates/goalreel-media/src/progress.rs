//! FFmpeg progress parsing.

use serde::{Deserialize, Serialize};

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Current FPS
    pub fps: f64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Output time as string (HH:MM:SS.microseconds)
    pub out_time: String,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Calculate progress percentage given total duration in milliseconds.
    pub fn percentage(&self, total_duration_ms: i64) -> f64 {
        if total_duration_ms <= 0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / total_duration_ms as f64) * 100.0).min(100.0)
    }
}

/// Progress callback that logs every `step` percent at debug level.
pub fn log_progress(label: String, total_duration_ms: i64, step: f64) -> impl Fn(FfmpegProgress) + Send + 'static {
    let last = std::sync::Mutex::new(-step);
    move |progress: FfmpegProgress| {
        let pct = progress.percentage(total_duration_ms);
        let Ok(mut last) = last.lock() else {
            return;
        };
        if progress.is_complete || pct - *last >= step {
            *last = pct;
            tracing::debug!(target: "goalreel::ffmpeg", "{}: {:.0}% (speed {:.2}x)", label, pct, progress.speed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 5000,
            ..Default::default()
        };

        assert!((progress.percentage(10000) - 50.0).abs() < 0.01);
        assert!((progress.percentage(5000) - 100.0).abs() < 0.01);
        assert_eq!(progress.percentage(0), 0.0);
    }

    #[test]
    fn test_percentage_is_capped() {
        let progress = FfmpegProgress {
            out_time_ms: 20_000,
            ..Default::default()
        };
        assert_eq!(progress.percentage(15_000), 100.0);
    }
}
