//! The highlight pipeline.
//!
//! One run goes through these stages, each finishing before the next starts:
//! 1. Obtain generated text (remote service or a saved answer)
//! 2. Parse goal ranges and titles
//! 3. Pair titles with ranges and normalize durations
//! 4. Extract captioned clips
//! 5. Assemble intro, clips and outro

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::Instrument;

use goalreel_media::{ClipExtractor, VideoAssembler};
use goalreel_ml_client::{GenerateClient, GenerateRequest};
use goalreel_models::{normalize_segments, pair_titles, parse_generated_text, DurationPolicy, GoalSegment};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::job::HighlightJob;
use crate::logging::{JobLogger, Stage};

/// Where a run gets its generated text from.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn generated_text(&self, job: &HighlightJob) -> WorkerResult<String>;
}

/// Asks the generation service about the job's video.
pub struct RemoteTextSource {
    client: GenerateClient,
    prompt: String,
    temperature: f64,
}

impl RemoteTextSource {
    pub fn new(client: GenerateClient, prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            client,
            prompt: prompt.into(),
            temperature,
        }
    }

    pub fn from_config(config: &WorkerConfig) -> WorkerResult<Self> {
        let client = GenerateClient::new(config.generation.clone())?;
        Ok(Self::new(client, config.prompt.clone(), config.temperature))
    }
}

#[async_trait]
impl TextSource for RemoteTextSource {
    async fn generated_text(&self, job: &HighlightJob) -> WorkerResult<String> {
        let video_id = job
            .video_id
            .as_deref()
            .ok_or_else(|| WorkerError::config_error("job has no video id"))?;

        let request = GenerateRequest::new(video_id)
            .with_prompt(self.prompt.clone())
            .with_temperature(self.temperature);

        Ok(self.client.generate(&request).await?)
    }
}

/// Reads a previously generated answer from disk.
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TextSource for FileTextSource {
    async fn generated_text(&self, _job: &HighlightJob) -> WorkerResult<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Saved answer when the job names one, the remote service otherwise.
pub fn text_source_for(job: &HighlightJob, config: &WorkerConfig) -> WorkerResult<Arc<dyn TextSource>> {
    match &job.response_file {
        Some(path) => Ok(Arc::new(FileTextSource::new(path))),
        None => Ok(Arc::new(RemoteTextSource::from_config(config)?)),
    }
}

/// Goal segments derived from one block of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPlan {
    /// Ranges found in the text
    pub goals_parsed: usize,
    /// Titles found in the text
    pub titles_parsed: usize,
    /// Segments that survived normalization, in goal order
    pub segments: Vec<GoalSegment>,
}

/// Parse, pair and normalize. Pure; never fails.
pub fn plan_segments(text: &str, policy: &DurationPolicy, fallback_title: &str) -> SegmentPlan {
    let parsed = parse_generated_text(text);
    let paired = pair_titles(&parsed.ranges, &parsed.titles, fallback_title);

    SegmentPlan {
        goals_parsed: parsed.ranges.len(),
        titles_parsed: parsed.titles.len(),
        segments: normalize_segments(paired, policy),
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightOutcome {
    /// Final highlight file
    pub output: PathBuf,
    /// Ranges found in the generated text
    pub goals_parsed: usize,
    /// Ranges left after normalization
    pub goals_kept: usize,
    /// Clips actually written (ranges inside the source)
    pub clips_written: usize,
    /// Captions in presentation order
    pub captions: Vec<String>,
    /// Highlight length in seconds, intro and outro included
    pub duration: f64,
}

/// Runs highlight jobs with one configuration.
pub struct HighlightPipeline {
    config: WorkerConfig,
    text_source: Arc<dyn TextSource>,
    extractor: ClipExtractor,
    assembler: VideoAssembler,
}

impl HighlightPipeline {
    pub fn new(config: WorkerConfig, text_source: Arc<dyn TextSource>) -> Self {
        let extractor = ClipExtractor::new(config.encoding.clone(), config.caption.clone())
            .with_timeout(config.ffmpeg_timeout_secs);
        let assembler =
            VideoAssembler::new(config.encoding.clone()).with_timeout(config.ffmpeg_timeout_secs);

        Self {
            config,
            text_source,
            extractor,
            assembler,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run one job end to end.
    pub async fn run(&self, job: &HighlightJob) -> WorkerResult<HighlightOutcome> {
        let logger = JobLogger::new(&job.job_id);
        let span = logger.create_span();

        let result = self.run_stages(job, &logger).instrument(span).await;
        if let Err(e) = &result {
            logger.log_error(&e.to_string());
        }
        result
    }

    async fn run_stages(&self, job: &HighlightJob, logger: &JobLogger) -> WorkerResult<HighlightOutcome> {
        logger.log_start(&job.source_video.display().to_string());

        let text = self.text_source.generated_text(job).await?;
        if text.trim().is_empty() {
            return Err(WorkerError::generation_failed("no text generated"));
        }
        logger.log_stage(Stage::Generate, &format!("received {} characters", text.len()));

        let plan = plan_segments(&text, &self.config.policy, &self.config.fallback_title);
        logger.log_stage(
            Stage::Parse,
            &format!("{} ranges, {} titles", plan.goals_parsed, plan.titles_parsed),
        );
        if plan.goals_parsed == 0 {
            logger.log_warning(Stage::Parse, "no goal ranges in generated text");
        }
        logger.log_stage(
            Stage::Normalize,
            &format!("{} of {} ranges kept", plan.segments.len(), plan.goals_parsed),
        );

        let clips_dir = job.clips_dir(&self.config.work_dir);
        let output = job.output_path(&self.config.work_dir);

        let clips = self
            .extractor
            .extract(&job.source_video, &plan.segments, &clips_dir)
            .await?;
        logger.log_stage(
            Stage::Extract,
            &format!("{} of {} clips written", clips.len(), plan.segments.len()),
        );

        let report = self
            .assembler
            .assemble_sequence(&clips, &job.intro, &job.outro, &output)
            .await?;
        logger.log_stage(
            Stage::Assemble,
            &format!("{} segments at {}x{}", report.segments, report.width, report.height),
        );

        if !self.config.keep_clips {
            remove_clips_dir(&clips_dir, logger).await;
        }

        logger.log_completion(&output.display().to_string(), clips.len());

        Ok(HighlightOutcome {
            output,
            goals_parsed: plan.goals_parsed,
            goals_kept: plan.segments.len(),
            clips_written: clips.len(),
            captions: clips.titles(),
            duration: report.duration,
        })
    }
}

async fn remove_clips_dir(dir: &Path, logger: &JobLogger) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        logger.log_warning(
            Stage::Cleanup,
            &format!("failed to remove {}: {}", dir.display(), e),
        );
    }
}
