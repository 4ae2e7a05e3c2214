//! FFmpeg filter graph builders.

use std::path::Path;

use goalreel_models::CaptionStyle;

/// Sample rate every assembled segment is resampled to.
pub const ASSEMBLY_SAMPLE_RATE: u32 = 44_100;

/// Quote a path for use as a filter option value.
pub fn quote_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    format!("'{}'", raw.replace('\'', r"'\''"))
}

/// Drawtext filter rendering the contents of `text_file` bottom-centre.
///
/// The text is read from a file so titles may contain quotes, colons or
/// emoji without filter escaping. `expansion=none` keeps `%` literal.
pub fn caption_filter(style: &CaptionStyle, text_file: &Path) -> String {
    let mut filter = format!(
        "drawtext=textfile={}:expansion=none:fontsize={}:fontcolor={}",
        quote_filter_path(text_file),
        style.font_size,
        style.font_color,
    );

    if let Some(font) = &style.font_file {
        filter.push_str(&format!(":fontfile={}", quote_filter_path(font)));
    }

    filter.push_str(&format!(
        ":box=1:boxcolor={}:boxborderw={}:x=(w-text_w)/2:y=h-text_h-{}",
        style.box_color,
        style.box_border,
        style.bottom_margin + style.box_border,
    ));

    filter
}

/// One assembly input as seen by the concat graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConcatInput {
    /// Whether the input has an audio stream
    pub has_audio: bool,
    /// Input duration in seconds (length of generated silence when audio is missing)
    pub duration: f64,
}

/// Filter graph that scales every input to exactly `width`x`height` and
/// concatenates them in input order.
///
/// Aspect ratio is not preserved. Inputs without audio get silence of
/// matching length so the concat filter sees one audio stream per segment.
/// Output labels are `[vout]` and `[aout]`.
pub fn concat_filter(inputs: &[ConcatInput], width: u32, height: u32, fps: f64) -> String {
    let mut chains = Vec::with_capacity(inputs.len() * 2 + 1);
    let mut concat_pads = String::new();

    for (i, input) in inputs.iter().enumerate() {
        chains.push(format!(
            "[{i}:v]scale={width}:{height},setsar=1,fps={fps:.3},format=yuv420p[v{i}]"
        ));

        if input.has_audio {
            chains.push(format!(
                "[{i}:a]aresample={rate},aformat=sample_fmts=fltp:channel_layouts=stereo[a{i}]",
                rate = ASSEMBLY_SAMPLE_RATE,
            ));
        } else {
            chains.push(format!(
                "anullsrc=channel_layout=stereo:sample_rate={rate},atrim=duration={dur:.3},aformat=sample_fmts=fltp[a{i}]",
                rate = ASSEMBLY_SAMPLE_RATE,
                dur = input.duration,
            ));
        }

        concat_pads.push_str(&format!("[v{i}][a{i}]"));
    }

    chains.push(format!(
        "{concat_pads}concat=n={}:v=1:a=1[vout][aout]",
        inputs.len()
    ));

    chains.join(";")
}
