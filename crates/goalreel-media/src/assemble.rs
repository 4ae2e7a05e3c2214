//! Final highlight assembly.
//!
//! The output timeline is intro, highlight clips, outro. Every segment is
//! scaled to the smallest width and smallest height found across all of
//! them (stretching when aspect ratios differ) and concatenated into one
//! file. The output only appears at its final path once the encode has
//! succeeded.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempPath;
use tracing::info;

use goalreel_models::{ClipSequence, EncodingConfig, OUTPUT_EXTENSION};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{concat_filter, ConcatInput};
use crate::fs_utils::list_numbered_files;
use crate::probe::{open_video, VideoInfo};
use crate::progress::log_progress;

/// Summary of a finished assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    /// Final output file
    pub output: PathBuf,
    /// Common frame width
    pub width: u32,
    /// Common frame height
    pub height: u32,
    /// Number of segments concatenated, intro and outro included
    pub segments: usize,
    /// Sum of input durations in seconds
    pub duration: f64,
}

/// Integer-named clips in `dir`, in ascending numeric order.
pub async fn scan_clip_dir(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    list_numbered_files(dir.as_ref()).await
}

/// Full presentation order: intro, clips, outro.
pub fn assembly_order(intro: &Path, clips: &[PathBuf], outro: &Path) -> Vec<PathBuf> {
    let mut order = Vec::with_capacity(clips.len() + 2);
    order.push(intro.to_path_buf());
    order.extend(clips.iter().cloned());
    order.push(outro.to_path_buf());
    order
}

/// Smallest width, smallest height and highest frame rate across `infos`.
fn common_geometry(infos: &[VideoInfo]) -> (u32, u32, f64) {
    let width = infos.iter().map(|i| i.width).min().unwrap_or(0);
    let height = infos.iter().map(|i| i.height).min().unwrap_or(0);
    let fps = infos.iter().map(|i| i.fps).fold(0.0, f64::max);
    (width, height, fps)
}

/// Concatenates intro, clips and outro into one file.
#[derive(Debug, Clone, Default)]
pub struct VideoAssembler {
    encoding: EncodingConfig,
    timeout_secs: Option<u64>,
}

impl VideoAssembler {
    /// Create an assembler with the given encoding.
    pub fn new(encoding: EncodingConfig) -> Self {
        Self {
            encoding,
            timeout_secs: None,
        }
    }

    /// FFmpeg timeout for the final encode.
    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Assemble clips in the order the extractor produced them.
    pub async fn assemble_sequence(
        &self,
        clips: &ClipSequence,
        intro: &Path,
        outro: &Path,
        output: &Path,
    ) -> MediaResult<AssemblyReport> {
        if clips.is_empty() {
            return Err(MediaError::NoClipsFound(clips.dir().to_path_buf()));
        }
        self.assemble_paths(&assembly_order(intro, &clips.paths(), outro), output)
            .await
    }

    /// Assemble the integer-named clips found in `dir`, sorted numerically.
    pub async fn assemble_directory(
        &self,
        dir: &Path,
        intro: &Path,
        outro: &Path,
        output: &Path,
    ) -> MediaResult<AssemblyReport> {
        let clips = scan_clip_dir(dir).await?;
        if clips.is_empty() {
            return Err(MediaError::NoClipsFound(dir.to_path_buf()));
        }
        self.assemble_paths(&assembly_order(intro, &clips, outro), output)
            .await
    }

    /// FFmpeg command concatenating `inputs` at `width`x`height`.
    pub fn concat_command(
        &self,
        inputs: &[PathBuf],
        infos: &[VideoInfo],
        output: &Path,
    ) -> FfmpegCommand {
        let (width, height, fps) = common_geometry(infos);
        let concat_inputs: Vec<ConcatInput> = infos
            .iter()
            .map(|i| ConcatInput {
                has_audio: i.has_audio,
                duration: i.duration,
            })
            .collect();

        FfmpegCommand::with_inputs(inputs, output)
            .filter_complex(concat_filter(&concat_inputs, width, height, fps))
            .map("[vout]")
            .map("[aout]")
            .output_args(self.encoding.to_ffmpeg_args())
    }

    async fn assemble_paths(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<AssemblyReport> {
        let started = Instant::now();

        let mut infos = Vec::with_capacity(inputs.len());
        for path in inputs {
            infos.push(open_video(path).await?);
        }

        let (width, height, fps) = common_geometry(&infos);
        let duration: f64 = infos.iter().map(|i| i.duration).sum();

        info!(
            segments = inputs.len(),
            width,
            height,
            fps,
            output = %output.display(),
            "Assembling highlight"
        );

        let out_dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&out_dir).await?;

        // Dropped without persisting on any error path, which deletes it
        let staging = tempfile::Builder::new()
            .prefix(".goalreel-")
            .suffix(&format!(".{}", OUTPUT_EXTENSION))
            .tempfile_in(&out_dir)?
            .into_temp_path();

        let cmd = self.concat_command(inputs, &infos, &staging);
        let total_ms = (duration * 1000.0) as i64;
        FfmpegRunner::new()
            .with_optional_timeout(self.timeout_secs)
            .run_with_progress(&cmd, log_progress("assembly".to_string(), total_ms, 10.0))
            .await?;

        publish_output(staging, output)?;

        metrics::counter!("goalreel_assemblies_total").increment(1);
        metrics::histogram!("goalreel_assembly_seconds").record(started.elapsed().as_secs_f64());

        info!(
            output = %output.display(),
            duration,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Highlight assembled"
        );

        Ok(AssemblyReport {
            output: output.to_path_buf(),
            width,
            height,
            segments: inputs.len(),
            duration,
        })
    }
}

/// Move a finished staging file to its final path.
///
/// Staging files are created owner-only; the published highlight gets the
/// usual `0644` instead.
fn publish_output(staging: TempPath, output: &Path) -> MediaResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o644))?;
    }

    staging.persist(output).map_err(|e| MediaError::Io(e.error))?;
    Ok(())
}

/// Assemble an in-memory clip sequence with default encoding.
pub async fn assemble_sequence(
    clips: &ClipSequence,
    intro: &Path,
    outro: &Path,
    output: &Path,
) -> MediaResult<AssemblyReport> {
    VideoAssembler::default()
        .assemble_sequence(clips, intro, outro, output)
        .await
}

/// Assemble the clips found in `dir` with default encoding.
pub async fn assemble_directory(
    dir: &Path,
    intro: &Path,
    outro: &Path,
    output: &Path,
) -> MediaResult<AssemblyReport> {
    VideoAssembler::default()
        .assemble_directory(dir, intro, outro, output)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_published_highlight_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let staging = tempfile::Builder::new()
            .prefix(".goalreel-")
            .tempfile_in(dir.path())
            .unwrap()
            .into_temp_path();
        let staged_mode = std::fs::metadata(&staging).unwrap().permissions().mode();
        assert_eq!(staged_mode & 0o777, 0o600);

        let output = dir.path().join("highlight.mp4");
        publish_output(staging, &output).unwrap();

        let mode = std::fs::metadata(&output).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    fn info(width: u32, height: u32, fps: f64, has_audio: bool) -> VideoInfo {
        VideoInfo {
            duration: 5.0,
            width,
            height,
            fps,
            codec: "h264".to_string(),
            has_audio,
        }
    }

    #[tokio::test]
    async fn test_order_is_numeric_between_intro_and_outro() {
        let dir = TempDir::new().unwrap();
        for name in ["10.mp4", "2.mp4", "1.mp4"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let clips = scan_clip_dir(dir.path()).await.unwrap();
        let order = assembly_order(Path::new("intro.mp4"), &clips, Path::new("outro.mp4"));
        let names: Vec<String> = order
            .iter()
            .map(|p| p.file_stem().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["intro", "1", "2", "10", "outro"]);
    }

    #[tokio::test]
    async fn test_empty_directory_fails_before_opening_intro() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"x").await.unwrap();
        let output = dir.path().join("highlight.mp4");

        // Intro and outro do not exist; NoClipsFound must win
        let result = assemble_directory(
            dir.path(),
            &dir.path().join("intro.mp4"),
            &dir.path().join("outro.mp4"),
            &output,
        )
        .await;

        assert!(matches!(result, Err(MediaError::NoClipsFound(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_sequence_reports_its_directory() {
        let result = assemble_sequence(
            &ClipSequence::in_dir("/work/job/clips"),
            Path::new("/nope/intro.mp4"),
            Path::new("/nope/outro.mp4"),
            Path::new("/nope/out.mp4"),
        )
        .await;

        match result {
            Err(MediaError::NoClipsFound(dir)) => assert_eq!(dir, PathBuf::from("/work/job/clips")),
            other => panic!("expected NoClipsFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unopenable_intro_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("0.mp4"), b"x").await.unwrap();
        let output = dir.path().join("highlight.mp4");

        let result = assemble_directory(
            dir.path(),
            &dir.path().join("missing-intro.mp4"),
            &dir.path().join("missing-outro.mp4"),
            &output,
        )
        .await;

        assert!(matches!(result, Err(MediaError::ResourceOpen { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_common_geometry_takes_minimums() {
        let infos = [
            info(1920, 1080, 25.0, true),
            info(1280, 960, 30.0, true),
            info(1440, 720, 29.97, false),
        ];
        assert_eq!(common_geometry(&infos), (1280, 720, 30.0));
    }

    #[test]
    fn test_concat_command_maps_filter_outputs() {
        let inputs = vec![
            PathBuf::from("/v/intro.mp4"),
            PathBuf::from("/v/0.mp4"),
            PathBuf::from("/v/outro.mp4"),
        ];
        let infos = [
            info(1920, 1080, 25.0, true),
            info(1280, 720, 25.0, true),
            info(1920, 1080, 25.0, false),
        ];

        let args = VideoAssembler::default()
            .concat_command(&inputs, &infos, Path::new("/v/out.mp4"))
            .build_args();
        let joined = args.join(" ");

        assert!(joined.contains("-i /v/intro.mp4 -i /v/0.mp4 -i /v/outro.mp4"));
        assert!(joined.contains("scale=1280:720"));
        assert!(joined.contains("-map [vout] -map [aout]"));
        assert!(joined.contains("concat=n=3:v=1:a=1"));
    }
}
