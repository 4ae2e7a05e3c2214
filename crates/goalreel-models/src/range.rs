//! Goal time ranges and their captions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caption used when the generated text has fewer titles than goals.
pub const DEFAULT_FALLBACK_TITLE: &str = "Goal Highlight";

/// A `[start, end)` interval of the source video in whole seconds.
///
/// Raw ranges come straight from generated text and are not validated, so
/// `end` may be smaller than `start`. Normalized ranges always satisfy
/// `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start offset in seconds
    pub start: u64,
    /// End offset in seconds
    pub end: u64,
}

impl TimeRange {
    /// Create a new range.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Signed duration in seconds (negative for inverted raw ranges).
    ///
    /// Exact for any pair of offsets.
    pub fn duration(&self) -> i128 {
        i128::from(self.end) - i128::from(self.start)
    }

    /// Start offset as fractional seconds, for FFmpeg seeking.
    pub fn start_secs(&self) -> f64 {
        self.start as f64
    }

    /// Duration as fractional seconds, clamped at zero.
    pub fn duration_secs(&self) -> f64 {
        self.duration().max(0) as f64
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s-{}s", self.start, self.end)
    }
}

impl From<(u64, u64)> for TimeRange {
    fn from((start, end): (u64, u64)) -> Self {
        Self::new(start, end)
    }
}

/// A goal's range carried together with its caption.
///
/// Keeping the pair in one value means any stage that drops a range drops
/// its caption with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSegment {
    /// Position of the goal in the generated text (0-based)
    pub goal_index: usize,
    /// Time range in the source video
    pub range: TimeRange,
    /// Caption rendered over the clip
    pub title: String,
}

impl GoalSegment {
    /// Create a new segment.
    pub fn new(goal_index: usize, range: TimeRange, title: impl Into<String>) -> Self {
        Self {
            goal_index,
            range,
            title: title.into(),
        }
    }

    /// Same goal and caption, different range.
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }
}

/// Pair the i-th range with the i-th title.
///
/// Surplus titles are ignored; ranges past the end of `titles` get `fallback`.
pub fn pair_titles(ranges: &[TimeRange], titles: &[String], fallback: &str) -> Vec<GoalSegment> {
    ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            let title = titles.get(i).map(String::as_str).unwrap_or(fallback);
            GoalSegment::new(i, *range, title)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_signed() {
        assert_eq!(TimeRange::new(10, 20).duration(), 10);
        assert_eq!(TimeRange::new(20, 10).duration(), -10);
        assert_eq!(TimeRange::new(20, 10).duration_secs(), 0.0);
    }

    #[test]
    fn test_duration_at_u64_extremes() {
        assert_eq!(TimeRange::new(0, u64::MAX).duration(), i128::from(u64::MAX));
        assert_eq!(TimeRange::new(u64::MAX, 0).duration(), -i128::from(u64::MAX));
        assert_eq!(TimeRange::new(u64::MAX, u64::MAX).duration(), 0);
    }

    #[test]
    fn test_pair_titles_with_shortage() {
        let ranges = vec![TimeRange::new(1, 2), TimeRange::new(3, 4), TimeRange::new(5, 6)];
        let titles = vec!["First".to_string()];

        let segments = pair_titles(&ranges, &titles, DEFAULT_FALLBACK_TITLE);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].title, "First");
        assert_eq!(segments[1].title, DEFAULT_FALLBACK_TITLE);
        assert_eq!(segments[2].title, DEFAULT_FALLBACK_TITLE);
        assert_eq!(segments[2].goal_index, 2);
    }

    #[test]
    fn test_pair_titles_with_surplus() {
        let ranges = vec![TimeRange::new(1, 2)];
        let titles = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        let segments = pair_titles(&ranges, &titles, DEFAULT_FALLBACK_TITLE);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].title, "A");
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeRange::new(8, 23).to_string(), "8s-23s");
    }
}
