//! Caption overlay styling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default caption font size in pixels.
pub const DEFAULT_FONT_SIZE: u32 = 48;

/// How a clip's title is drawn over the video.
///
/// The caption is anchored bottom-centre and shown for the whole clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionStyle {
    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Text colour (FFmpeg colour syntax)
    #[serde(default = "default_font_color")]
    pub font_color: String,
    /// Background box colour behind the text
    #[serde(default = "default_box_color")]
    pub box_color: String,
    /// Padding around the text inside the box (pixels)
    #[serde(default = "default_box_border")]
    pub box_border: u32,
    /// Distance from the bottom edge (pixels)
    #[serde(default)]
    pub bottom_margin: u32,
    /// Font file; FFmpeg's default font when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}
fn default_font_color() -> String {
    "white".to_string()
}
fn default_box_color() -> String {
    "black".to_string()
}
fn default_box_border() -> u32 {
    8
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_color: default_font_color(),
            box_color: default_box_color(),
            box_border: default_box_border(),
            bottom_margin: 0,
            font_file: None,
        }
    }
}

impl CaptionStyle {
    /// Set the font size.
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Use a specific font file (needed for emoji glyphs on most systems).
    pub fn with_font_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_file = Some(path.into());
        self
    }
}
