//! Shared data models for the GoalReel highlight pipeline.
//!
//! This crate provides Serde-serializable types and the pure (I/O-free)
//! front half of the pipeline:
//! - Parsing generated text into goal ranges and titles
//! - Pairing ranges with their captions
//! - Normalizing ranges to a fixed clip duration
//! - Encoding and caption configuration
//! - The ordered clip list handed from extraction to assembly

pub mod caption;
pub mod clip;
pub mod encoding;
pub mod job;
pub mod normalize;
pub mod range;
pub mod response;

// Re-export common types
pub use caption::CaptionStyle;
pub use clip::{clip_file_name, clip_position, ClipFile, ClipSequence};
pub use encoding::{EncodingConfig, OUTPUT_EXTENSION};
pub use job::JobId;
pub use normalize::{
    normalize_ranges, normalize_segments, DurationPolicy, PolicyError, DEFAULT_MAX_DURATION,
    DEFAULT_MIN_DURATION, DEFAULT_TARGET_DURATION,
};
pub use range::{pair_titles, GoalSegment, TimeRange, DEFAULT_FALLBACK_TITLE};
pub use response::{extract_titles, parse_generated_text, parse_time_ranges, ParsedResponse};
