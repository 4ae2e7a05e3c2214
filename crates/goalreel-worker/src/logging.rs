//! Structured job logging utilities.
//!
//! Every line carries the job id and the pipeline stage it belongs to, so a
//! single run can be followed through the log even when several runs share
//! one process.

use std::fmt;

use tracing::{error, info, warn, Span};

use goalreel_models::JobId;

/// Pipeline stage a log line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generate,
    Parse,
    Normalize,
    Extract,
    Assemble,
    Cleanup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generate => "generate",
            Stage::Parse => "parse",
            Stage::Normalize => "normalize",
            Stage::Extract => "extract",
            Stage::Assemble => "assemble",
            Stage::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger bound to one highlight run.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, source: &str) {
        info!(job_id = %self.job_id, source = %source, "Highlight job started");
    }

    /// Log the outcome of one stage.
    pub fn log_stage(&self, stage: Stage, message: &str) {
        info!(job_id = %self.job_id, stage = %stage, "{}", message);
    }

    /// Log a recoverable problem.
    pub fn log_warning(&self, stage: Stage, message: &str) {
        warn!(job_id = %self.job_id, stage = %stage, "{}", message);
    }

    /// Log the failure that ends a run.
    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, "Highlight job failed: {}", message);
    }

    /// Log the end of a successful run.
    pub fn log_completion(&self, output: &str, clips: usize) {
        info!(job_id = %self.job_id, output = %output, clips, "Highlight job completed");
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id)
    }
}
