//! Tolerant scanner for generated goal descriptions.
//!
//! The remote text-generation service answers in free-form prose. The only
//! structure we rely on is a handful of textual markers:
//!
//! - `Start Time: <digits>s` / `End Time: <digits>s`, any number of times
//! - a single `Title Array = [...]` followed by a comma-separated list of
//!   quoted titles
//!
//! Missing markers produce empty results, never errors. Titles containing
//! commas or quotes are not supported; the list is split naively. Blank
//! entries are kept so later titles stay aligned with their goals.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::range::TimeRange;

/// Marker that introduces the title list.
pub const TITLE_ARRAY_MARKER: &str = "Title Array =";

static START_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Start Time:\s*(\d+)s").expect("valid start time pattern"));

static END_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"End Time:\s*(\d+)s").expect("valid end time pattern"));

/// Raw ranges and titles scanned from one block of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Ranges in order of appearance, before normalization
    pub ranges: Vec<TimeRange>,
    /// Titles in order of appearance
    pub titles: Vec<String>,
}

impl ParsedResponse {
    /// True when neither ranges nor titles were found.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.titles.is_empty()
    }
}

/// Scan generated text for goal ranges and titles.
pub fn parse_generated_text(text: &str) -> ParsedResponse {
    let parsed = ParsedResponse {
        ranges: parse_time_ranges(text),
        titles: extract_titles(text),
    };

    tracing::debug!(
        ranges = parsed.ranges.len(),
        titles = parsed.titles.len(),
        "Parsed generated text"
    );

    parsed
}

/// Collect `Start Time`/`End Time` values and pair them positionally.
///
/// Starts and ends are scanned independently; the i-th start pairs with the
/// i-th end. Extra values on either side are dropped.
pub fn parse_time_ranges(text: &str) -> Vec<TimeRange> {
    let starts = capture_seconds(&START_TIME, text);
    let ends = capture_seconds(&END_TIME, text);

    starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| TimeRange::new(start, end))
        .collect()
}

/// Extract the title list following [`TITLE_ARRAY_MARKER`].
pub fn extract_titles(text: &str) -> Vec<String> {
    let Some((_, rest)) = text.split_once(TITLE_ARRAY_MARKER) else {
        return Vec::new();
    };

    split_title_array(rest)
}

fn capture_seconds(pattern: &Regex, text: &str) -> Vec<u64> {
    pattern
        .captures_iter(text)
        // Digit runs too long for u64 are skipped
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

/// Split `[ "a", 'b', c ]` into its items.
///
/// Only one bracket pair is recognized. When the list opens with `[` the
/// scan stops at the first `]`, so trailing prose after the array is ignored.
fn split_title_array(raw: &str) -> Vec<String> {
    let raw = raw.trim();

    let inner = match raw.strip_prefix('[') {
        Some(body) => body.split_once(']').map_or(body, |(inside, _)| inside),
        None => raw.strip_suffix(']').unwrap_or(raw),
    };

    if inner.trim().is_empty() {
        return Vec::new();
    }

    inner
        .split(',')
        .map(|item| strip_quotes(item.trim()).trim().to_string())
        .collect()
}

fn strip_quotes(item: &str) -> &str {
    let item = item
        .strip_prefix('"')
        .or_else(|| item.strip_prefix('\''))
        .unwrap_or(item);
    item.strip_suffix('"')
        .or_else(|| item.strip_suffix('\''))
        .unwrap_or(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"Start Time: 10s End Time: 20s Start Time: 50s End Time: 52s Title Array = ["Great Goal", "Wow"]"#;

    #[test]
    fn test_parse_sample() {
        let parsed = parse_generated_text(SAMPLE);
        assert_eq!(
            parsed.ranges,
            vec![TimeRange::new(10, 20), TimeRange::new(50, 52)]
        );
        assert_eq!(parsed.titles, vec!["Great Goal", "Wow"]);
    }

    #[test]
    fn test_empty_text() {
        let parsed = parse_generated_text("");
        assert!(parsed.is_empty());

        let parsed = parse_generated_text("The match ended 0-0, no goals were scored.");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_mismatched_counts_truncate() {
        let text = "Start Time: 1s End Time: 5s Start Time: 9s Start Time: 30s";
        let ranges = parse_time_ranges(text);
        assert_eq!(ranges, vec![TimeRange::new(1, 5)]);
    }

    #[test]
    fn test_pairing_is_positional() {
        // Ends listed before starts still pair by position
        let text = "End Time: 40s End Time: 80s\nStart Time: 30s\nStart Time: 70s";
        let ranges = parse_time_ranges(text);
        assert_eq!(ranges, vec![TimeRange::new(30, 40), TimeRange::new(70, 80)]);
    }

    #[test]
    fn test_whitespace_after_colon() {
        let text = "Start Time:   12s\nEnd Time:\t27s";
        assert_eq!(parse_time_ranges(text), vec![TimeRange::new(12, 27)]);
    }

    #[test]
    fn test_missing_seconds_suffix_is_ignored() {
        let text = "Start Time: 12 End Time: 27s";
        assert!(parse_time_ranges(text).is_empty());
    }

    #[test]
    fn test_titles_absent() {
        assert!(extract_titles("Start Time: 1s End Time: 2s").is_empty());
    }

    #[test]
    fn test_titles_mixed_quotes() {
        let text = r#"Title Array = ['Rocket ⚽', "Header!", Volley]"#;
        assert_eq!(extract_titles(text), vec!["Rocket ⚽", "Header!", "Volley"]);
    }

    #[test]
    fn test_titles_with_trailing_prose() {
        let text = "Here you go.\nTitle Array = [\"One\", \"Two\"]\n\nEnjoy the highlights!";
        assert_eq!(extract_titles(text), vec!["One", "Two"]);
    }

    #[test]
    fn test_titles_empty_array() {
        assert!(extract_titles("Title Array = []").is_empty());
        assert!(extract_titles("Title Array =").is_empty());
    }

    #[test]
    fn test_titles_malformed_array_never_panics() {
        assert_eq!(extract_titles("Title Array = [\"Open"), vec!["Open"]);
        assert_eq!(extract_titles("Title Array = \"Solo\"]"), vec!["Solo"]);
        assert_eq!(extract_titles("Title Array = [,,]"), vec!["", "", ""]);
    }

    #[test]
    fn test_blank_title_keeps_its_slot() {
        let text = r#"Title Array = ["A", "", "C"]"#;
        assert_eq!(extract_titles(text), vec!["A", "", "C"]);

        let text = "Title Array = [\"A\",   , 'C']";
        assert_eq!(extract_titles(text), vec!["A", "", "C"]);
    }

    #[test]
    fn test_only_first_marker_is_used() {
        let text = "Title Array = [\"A\"] and again Title Array = [\"B\"]";
        assert_eq!(extract_titles(text), vec!["A"]);
    }

    #[test]
    fn test_overflowing_digits_skipped() {
        let text = "Start Time: 99999999999999999999999s End Time: 5s";
        assert!(parse_time_ranges(text).is_empty());
    }

    #[test]
    fn test_u64_max_seconds_are_kept() {
        let text = "Start Time: 18446744073709551615s End Time: 0s";
        assert_eq!(parse_time_ranges(text), vec![TimeRange::new(u64::MAX, 0)]);
    }
}
