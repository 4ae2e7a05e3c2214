//! Extracted clips and their presentation order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::encoding::OUTPUT_EXTENSION;
use crate::range::GoalSegment;

/// File name for the clip at `position` (e.g. `3.mp4`).
///
/// The integer stem is the ordering key whenever clips are handed over
/// through a directory rather than in memory.
pub fn clip_file_name(position: usize) -> String {
    format!("{}.{}", position, OUTPUT_EXTENSION)
}

/// Presentation position encoded in a clip file name, if any.
///
/// Only the stem is considered, so `7.mp4` and `7.mov` both yield 7 while
/// `intro.mp4` and `07b.mp4` yield `None`.
pub fn clip_position(path: &Path) -> Option<usize> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// One captioned clip written by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipFile {
    /// Zero-based presentation position
    pub position: usize,
    /// Location of the encoded clip
    pub path: PathBuf,
    /// Goal this clip was cut from
    pub segment: GoalSegment,
}

/// Ordered, gapless list of clips, position 0 first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSequence {
    /// Directory the clips were written to
    dir: PathBuf,
    clips: Vec<ClipFile>,
}

impl ClipSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence for clips written under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clips: Vec::new(),
        }
    }

    /// Directory the clips were written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Position the next pushed clip will take.
    pub fn next_position(&self) -> usize {
        self.clips.len()
    }

    /// Append a clip at the next position.
    pub fn push(&mut self, path: impl Into<PathBuf>, segment: GoalSegment) -> &ClipFile {
        let position = self.next_position();
        self.clips.push(ClipFile {
            position,
            path: path.into(),
            segment,
        });
        &self.clips[position]
    }

    /// Number of clips.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// True when no clip was written.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Iterate in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &ClipFile> {
        self.clips.iter()
    }

    /// Clip paths in presentation order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.clips.iter().map(|c| c.path.clone()).collect()
    }

    /// Captions in presentation order.
    pub fn titles(&self) -> Vec<String> {
        self.clips.iter().map(|c| c.segment.title.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a ClipSequence {
    type Item = &'a ClipFile;
    type IntoIter = std::slice::Iter<'a, ClipFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.clips.iter()
    }
}
