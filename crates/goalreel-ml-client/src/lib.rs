//! Client for the video-understanding text generation service.
//!
//! The service watches an indexed video and answers a free-form prompt.
//! Answers are streamed back as newline-delimited JSON events; this crate
//! stitches the `text_generation` events into one string.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GenerateClient, GenerateClientConfig, DEFAULT_BASE_URL};
pub use error::{GenerateError, GenerateResult};
pub use types::{
    collect_generated_text, GenerateRequest, TextAccumulator, DEFAULT_PROMPT, DEFAULT_TEMPERATURE,
};
