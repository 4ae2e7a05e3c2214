//! Goal highlight worker binary.
//!
//! Runs a single highlight job described by environment variables and
//! exits non-zero if any stage fails.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use goalreel_worker::{text_source_for, HighlightJob, HighlightPipeline, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("goalreel=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting goalreel-worker");

    let config = match WorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let job = match HighlightJob::from_env() {
        Ok(j) => j,
        Err(e) => {
            error!("Invalid job: {}", e);
            std::process::exit(1);
        }
    };

    let text_source = match text_source_for(&job, &config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create text source: {}", e);
            std::process::exit(1);
        }
    };

    let pipeline = HighlightPipeline::new(config, text_source);

    match pipeline.run(&job).await {
        Ok(outcome) => {
            info!(
                output = %outcome.output.display(),
                clips = outcome.clips_written,
                "Highlight ready"
            );
            match serde_json::to_string_pretty(&outcome) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("Failed to serialize outcome: {}", e),
            }
        }
        Err(e) => {
            error!(job_id = %job.job_id, "Highlight job failed: {}", e);
            std::process::exit(1);
        }
    }
}
