//! Per-run job description.

use std::path::{Path, PathBuf};

use goalreel_models::JobId;
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};

/// Everything one pipeline run needs besides configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightJob {
    /// Run identifier; names the working directory
    pub job_id: JobId,
    /// Indexed video id at the generation service
    pub video_id: Option<String>,
    /// Full match recording
    pub source_video: PathBuf,
    /// Clip played before the highlights
    pub intro: PathBuf,
    /// Clip played after the highlights
    pub outro: PathBuf,
    /// Final output path; defaults to `highlight.mp4` in the job directory
    pub output: Option<PathBuf>,
    /// Previously generated text to use instead of calling the service
    pub response_file: Option<PathBuf>,
}

impl HighlightJob {
    /// Create a job with a fresh id.
    pub fn new(
        source_video: impl Into<PathBuf>,
        intro: impl Into<PathBuf>,
        outro: impl Into<PathBuf>,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            video_id: None,
            source_video: source_video.into(),
            intro: intro.into(),
            outro: outro.into(),
            output: None,
            response_file: None,
        }
    }

    pub fn with_video_id(mut self, video_id: impl Into<String>) -> Self {
        self.video_id = Some(video_id.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_response_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.response_file = Some(path.into());
        self
    }

    /// Read the job from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the job from an arbitrary variable lookup.
    ///
    /// Source, intro and outro are required. A video id is required unless
    /// a response file is given.
    pub fn from_vars<F>(var: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key)
                .map(PathBuf::from)
                .ok_or_else(|| WorkerError::config_error(format!("{} not set", key)))
        };

        let job = Self {
            job_id: get("GOALREEL_JOB_ID")
                .map(JobId::from_string)
                .unwrap_or_default(),
            video_id: get("GOALREEL_VIDEO_ID"),
            source_video: required("GOALREEL_SOURCE_VIDEO")?,
            intro: required("GOALREEL_INTRO")?,
            outro: required("GOALREEL_OUTRO")?,
            output: get("GOALREEL_OUTPUT").map(PathBuf::from),
            response_file: get("GOALREEL_RESPONSE_FILE").map(PathBuf::from),
        };

        if job.video_id.is_none() && job.response_file.is_none() {
            return Err(WorkerError::config_error(
                "GOALREEL_VIDEO_ID not set (or provide GOALREEL_RESPONSE_FILE)",
            ));
        }

        Ok(job)
    }

    /// Working directory for this run.
    pub fn job_dir(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(self.job_id.as_str())
    }

    /// Directory the clips of this run are written to.
    pub fn clips_dir(&self, work_dir: &Path) -> PathBuf {
        self.job_dir(work_dir).join("clips")
    }

    /// Where the final highlight is written.
    pub fn output_path(&self, work_dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.job_dir(work_dir).join("highlight.mp4"))
    }
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

    const PATHS: [(&str, &str); 3] = [
        ("GOALREEL_SOURCE_VIDEO", "/in/match.mp4"),
        ("GOALREEL_INTRO", "/in/intro.mp4"),
        ("GOALREEL_OUTRO", "/in/outro.mp4"),
    ];

    #[test]
    fn test_from_vars_with_video_id() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("GOALREEL_VIDEO_ID", "vid-1"));
        pairs.push(("GOALREEL_JOB_ID", "job-42"));

        let job = HighlightJob::from_vars(lookup(&pairs)).unwrap();
        assert_eq!(job.job_id.as_str(), "job-42");
        assert_eq!(job.video_id.as_deref(), Some("vid-1"));
        assert_eq!(job.source_video, PathBuf::from("/in/match.mp4"));
        assert_eq!(
            job.output_path(Path::new("/work")),
            PathBuf::from("/work/job-42/highlight.mp4")
        );
        assert_eq!(job.clips_dir(Path::new("/work")), PathBuf::from("/work/job-42/clips"));
    }

    #[test]
    fn test_response_file_replaces_video_id() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("GOALREEL_RESPONSE_FILE", "/in/answer.txt"));
        pairs.push(("GOALREEL_OUTPUT", "/out/final.mp4"));

        let job = HighlightJob::from_vars(lookup(&pairs)).unwrap();
        assert!(job.video_id.is_none());
        assert_eq!(job.output_path(Path::new("/work")), PathBuf::from("/out/final.mp4"));
    }

    #[test]
    fn test_missing_inputs_are_config_errors() {
        let err = HighlightJob::from_vars(lookup(&PATHS)).unwrap_err();
        assert!(err.to_string().contains("GOALREEL_VIDEO_ID"));

        let err = HighlightJob::from_vars(lookup(&[("GOALREEL_VIDEO_ID", "v")])).unwrap_err();
        assert!(err.to_string().contains("GOALREEL_SOURCE_VIDEO not set"));
    }

    #[test]
    fn test_jobs_get_distinct_directories() {
        let a = HighlightJob::new("s.mp4", "i.mp4", "o.mp4");
        let b = HighlightJob::new("s.mp4", "i.mp4", "o.mp4");
        assert_ne!(a.clips_dir(Path::new("/w")), b.clips_dir(Path::new("/w")));
    }
}
