//! Request and streamed response types.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prompt asking for goal timestamps and a copy-pasteable title list.
pub const DEFAULT_PROMPT: &str = "Provide timestamps of all the 3 goals that were scored in this match in the format of start time to end time. \
Also, act as a sports video editor and provide catch titles to be used for the clips when used as a part of match highlights video. \
Use the correct emojis in the title. The titles should be in a ready to copy paste array as Title Array = ";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Event type carrying generated text.
const TEXT_GENERATION_EVENT: &str = "text_generation";

/// Body of a `/generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Indexed video to ask about
    pub video_id: String,
    /// Free-form prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Ask for an NDJSON event stream
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

impl GenerateRequest {
    /// Request with the default goals prompt and temperature.
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            prompt: DEFAULT_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            stream: true,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// One line of the streamed response.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    event_type: String,
    #[serde(default)]
    text: String,
}

/// Incremental NDJSON decoder.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence, so
/// lines are only decoded once their terminating newline has been seen.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    pending: Vec<u8>,
    text: String,
    skipped: usize,
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body.
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.consume_line(&line[..newline]);
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of non-empty lines that could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Flush a trailing unterminated line and return the text.
    pub fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&rest);
        if self.skipped > 0 {
            debug!(skipped = self.skipped, "Ignored undecodable stream lines");
        }
        self.text
    }

    fn consume_line(&mut self, line: &[u8]) {
        let Ok(line) = std::str::from_utf8(line) else {
            self.skipped += 1;
            return;
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<StreamEvent>(line) {
            Ok(event) if event.event_type == TEXT_GENERATION_EVENT => self.text.push_str(&event.text),
            Ok(_) => {}
            Err(_) => self.skipped += 1,
        }
    }
}

/// Concatenate the text of every `text_generation` event in `body`.
pub fn collect_generated_text(body: &str) -> String {
    let mut acc = TextAccumulator::new();
    acc.push(body.as_bytes());
    acc.finish()
}
