//! FFmpeg CLI wrapper for highlight assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:2`
//! - FFprobe-based source video inspection
//! - Captioned clip extraction from a source recording
//! - Intro + clips + outro assembly with resolution reconciliation

pub mod assemble;
pub mod clip;
pub mod command;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod progress;

pub use assemble::{
    assemble_directory, assemble_sequence, assembly_order, scan_clip_dir, AssemblyReport,
    VideoAssembler,
};
pub use clip::{extract_clips, plan_clips, ClipExtractor, PlannedClip};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{open_video, probe_video, VideoInfo};
pub use progress::FfmpegProgress;
