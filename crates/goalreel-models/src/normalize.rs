//! Duration normalization for goal ranges.
//!
//! Every highlight clip should last exactly `target` seconds:
//! - ranges longer than `max` are dropped
//! - ranges shorter than `min` are padded symmetrically to `target`
//! - everything else passes through untouched
//!
//! Padding happens around the original centre. When the padded start would
//! go below zero it is clamped and the end is recomputed from the clamped
//! start, so the clip keeps its full target length.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::range::{GoalSegment, TimeRange};

/// Default minimum clip length in seconds.
pub const DEFAULT_MIN_DURATION: u64 = 15;
/// Default maximum clip length in seconds.
pub const DEFAULT_MAX_DURATION: u64 = 15;
/// Default target clip length in seconds.
pub const DEFAULT_TARGET_DURATION: u64 = 15;

/// Invalid duration policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("min_duration ({min}) is greater than max_duration ({max})")]
    MinExceedsMax { min: u64, max: u64 },

    #[error("target_duration ({target}) must lie within [{min}, {max}]")]
    TargetOutOfBounds { target: u64, min: u64, max: u64 },
}

/// Clip duration thresholds, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPolicy {
    /// Ranges shorter than this are padded
    #[serde(default = "default_min")]
    pub min_duration: u64,
    /// Ranges longer than this are dropped
    #[serde(default = "default_max")]
    pub max_duration: u64,
    /// Length of a padded range
    #[serde(default = "default_target")]
    pub target_duration: u64,
}

fn default_min() -> u64 {
    DEFAULT_MIN_DURATION
}
fn default_max() -> u64 {
    DEFAULT_MAX_DURATION
}
fn default_target() -> u64 {
    DEFAULT_TARGET_DURATION
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
            target_duration: DEFAULT_TARGET_DURATION,
        }
    }
}

impl DurationPolicy {
    /// Create a validated policy.
    ///
    /// `target` must lie in `[min, max]`; this keeps normalization idempotent.
    pub fn new(min_duration: u64, max_duration: u64, target_duration: u64) -> Result<Self, PolicyError> {
        let policy = Self {
            min_duration,
            max_duration,
            target_duration,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check the threshold ordering.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.min_duration > self.max_duration {
            return Err(PolicyError::MinExceedsMax {
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        if self.target_duration < self.min_duration || self.target_duration > self.max_duration {
            return Err(PolicyError::TargetOutOfBounds {
                target: self.target_duration,
                min: self.min_duration,
                max: self.max_duration,
            });
        }
        Ok(())
    }

    /// Apply the policy to one range. `None` means the range is rejected.
    pub fn apply(&self, range: TimeRange) -> Option<TimeRange> {
        let duration = range.duration();

        if duration > i128::from(self.max_duration) {
            return None;
        }

        if duration < i128::from(self.min_duration) {
            let extra = i128::from(self.target_duration) - duration;
            let pad_before = extra.div_euclid(2);
            // Never above range.start, so it fits back into u64
            let start = (i128::from(range.start) - pad_before).max(0) as u64;
            // Saturates only for starts within target of u64::MAX
            return Some(TimeRange::new(start, start.saturating_add(self.target_duration)));
        }

        Some(range)
    }
}

/// Normalize bare ranges. Output order follows input order; rejected ranges
/// leave no gap.
pub fn normalize_ranges(ranges: &[TimeRange], policy: &DurationPolicy) -> Vec<TimeRange> {
    ranges
        .iter()
        .filter_map(|range| {
            let normalized = policy.apply(*range);
            if normalized.is_none() {
                debug!(range = %range, "Dropping range longer than max duration");
            }
            normalized
        })
        .collect()
}

/// Normalize paired segments. A rejected range takes its caption with it.
pub fn normalize_segments(segments: Vec<GoalSegment>, policy: &DurationPolicy) -> Vec<GoalSegment> {
    segments
        .into_iter()
        .filter_map(|segment| match policy.apply(segment.range) {
            Some(range) => Some(segment.with_range(range)),
            None => {
                debug!(
                    goal = segment.goal_index,
                    range = %segment.range,
                    title = %segment.title,
                    "Dropping goal longer than max duration"
                );
                None
            }
        })
        .collect()
}
