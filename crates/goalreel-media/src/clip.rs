//! Captioned clip extraction.
//!
//! One clip is cut per goal segment, with its caption burned in at the
//! bottom of the frame. Clips are written as `<position>.mp4` where
//! `position` counts only the segments that fit inside the source, so the
//! file names always run `0, 1, 2, ...` without gaps.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use goalreel_models::{clip_file_name, CaptionStyle, ClipSequence, EncodingConfig, GoalSegment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::caption_filter;
use crate::fs_utils::{move_file, remove_numbered_files};
use crate::probe::open_video;
use crate::progress::log_progress;

/// A segment that fits inside the source, with its output position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedClip {
    /// Zero-based output position
    pub position: usize,
    /// Goal segment to cut
    pub segment: GoalSegment,
}

/// Drop segments ending past `source_duration` and number the rest densely.
pub fn plan_clips(segments: &[GoalSegment], source_duration: f64) -> Vec<PlannedClip> {
    let mut planned = Vec::with_capacity(segments.len());
    let mut skipped = 0u64;

    for segment in segments {
        if segment.range.end as f64 > source_duration {
            debug!(
                goal = segment.goal_index,
                range = %segment.range,
                source_duration,
                "Skipping clip past end of source"
            );
            skipped += 1;
            continue;
        }

        planned.push(PlannedClip {
            position: planned.len(),
            segment: segment.clone(),
        });
    }

    if skipped > 0 {
        metrics::counter!("goalreel_clips_skipped_total").increment(skipped);
    }

    planned
}

/// Cuts captioned clips out of a source recording.
#[derive(Debug, Clone, Default)]
pub struct ClipExtractor {
    encoding: EncodingConfig,
    caption: CaptionStyle,
    timeout_secs: Option<u64>,
}

impl ClipExtractor {
    /// Create an extractor with the given encoding and caption style.
    pub fn new(encoding: EncodingConfig, caption: CaptionStyle) -> Self {
        Self {
            encoding,
            caption,
            timeout_secs: None,
        }
    }

    /// Per-clip FFmpeg timeout.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// FFmpeg command encoding one clip with its caption read from `caption_file`.
    pub fn clip_command(
        &self,
        source: &Path,
        clip: &PlannedClip,
        caption_file: &Path,
        output: &Path,
    ) -> FfmpegCommand {
        let range = clip.segment.range;
        FfmpegCommand::new(source, output)
            .seek(range.start_secs())
            .duration(range.duration_secs())
            .video_filter(caption_filter(&self.caption, caption_file))
            .output_args(self.encoding.to_ffmpeg_args())
    }

    /// Extract one clip per segment into `clips_dir`.
    ///
    /// The source is opened before anything is written; if that fails the
    /// whole call fails and `clips_dir` is left untouched. Integer-named
    /// files from an earlier run are removed first. If an encode fails, the
    /// clips written by this call are removed and the error is returned.
    pub async fn extract(
        &self,
        source: &Path,
        segments: &[GoalSegment],
        clips_dir: &Path,
    ) -> MediaResult<ClipSequence> {
        let info = open_video(source).await?;
        let planned = plan_clips(segments, info.duration);

        info!(
            source = %source.display(),
            duration = info.duration,
            segments = segments.len(),
            planned = planned.len(),
            "Extracting highlight clips"
        );

        fs::create_dir_all(clips_dir).await?;
        let stale = remove_numbered_files(clips_dir).await?;
        if stale > 0 {
            debug!(dir = %clips_dir.display(), stale, "Removed clips from an earlier run");
        }

        let captions = tempfile::tempdir()?;
        let runner = FfmpegRunner::new().with_optional_timeout(self.timeout_secs);
        let mut sequence = ClipSequence::in_dir(clips_dir);

        for clip in &planned {
            match self
                .extract_one(&runner, source, clip, captions.path(), clips_dir)
                .await
            {
                Ok(path) => {
                    metrics::counter!("goalreel_clips_written_total").increment(1);
                    sequence.push(path, clip.segment.clone());
                }
                Err(e) => {
                    warn!(position = clip.position, error = %e, "Clip encode failed");
                    discard_clips(&sequence).await;
                    return Err(e);
                }
            }
        }

        Ok(sequence)
    }

    async fn extract_one(
        &self,
        runner: &FfmpegRunner,
        source: &Path,
        clip: &PlannedClip,
        captions_dir: &Path,
        clips_dir: &Path,
    ) -> MediaResult<PathBuf> {
        let caption_file = captions_dir.join(format!("caption-{}.txt", clip.position));
        fs::write(&caption_file, clip.segment.title.as_bytes()).await?;

        let final_path = clips_dir.join(clip_file_name(clip.position));
        // Leading dot keeps the partial file out of integer-name scans
        let partial = clips_dir.join(format!(".{}.partial.mp4", clip.position));

        let cmd = self.clip_command(source, clip, &caption_file, &partial);
        let total_ms = (clip.segment.range.duration_secs() * 1000.0) as i64;
        let label = format!("clip {}", clip.position);

        if let Err(e) = runner
            .run_with_progress(&cmd, log_progress(label, total_ms, 25.0))
            .await
        {
            let _ = fs::remove_file(&partial).await;
            return Err(e);
        }

        move_file(&partial, &final_path).await?;

        debug!(
            position = clip.position,
            goal = clip.segment.goal_index,
            range = %clip.segment.range,
            title = %clip.segment.title,
            path = %final_path.display(),
            "Wrote clip"
        );

        Ok(final_path)
    }
}

async fn discard_clips(sequence: &ClipSequence) {
    for clip in sequence {
        if let Err(e) = fs::remove_file(&clip.path).await {
            warn!(path = %clip.path.display(), error = %e, "Failed to remove clip");
        }
    }
}

/// Extract clips with the given encoding and caption style and no timeout.
pub async fn extract_clips(
    source: &Path,
    segments: &[GoalSegment],
    clips_dir: &Path,
    encoding: &EncodingConfig,
    caption: &CaptionStyle,
) -> MediaResult<ClipSequence> {
    ClipExtractor::new(encoding.clone(), caption.clone())
        .extract(source, segments, clips_dir)
        .await
}
