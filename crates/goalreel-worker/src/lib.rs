//! Goal highlight pipeline runner.
//!
//! This crate provides:
//! - Environment-driven configuration
//! - The per-run job description
//! - The pipeline: generated text -> goal segments -> clips -> highlight
//! - Structured job logging

pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use job::HighlightJob;
pub use logging::{JobLogger, Stage};
pub use pipeline::{
    plan_segments, text_source_for, FileTextSource, HighlightOutcome, HighlightPipeline,
    RemoteTextSource, SegmentPlan, TextSource,
};
