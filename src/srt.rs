use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::captions::{CaptionSegment, RetrievalResult};

// @module: SRT serialization and export

// @const: Characters that cannot appear in a file name on common platforms
static ILLEGAL_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1F]"#).unwrap());

/// File name used when the title gives nothing usable
pub const DEFAULT_EXPORT_NAME: &str = "subtitles";

// @struct: Single SRT block
#[derive(Debug, Clone, PartialEq)]
pub struct SrtEntry<'a> {
    // @field: 1-based sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text
    pub text: &'a str,
}

impl<'a> SrtEntry<'a> {
    /// Build the block for the segment at 1-based position `seq_num`
    pub fn from_segment(seq_num: usize, segment: &'a CaptionSegment) -> Self {
        SrtEntry {
            seq_num,
            start_time_ms: seconds_to_ms(segment.start as f64),
            end_time_ms: seconds_to_ms(segment.end()),
            text: &segment.text,
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SrtEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n\n",
            self.seq_num,
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms),
            self.text
        )
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Render a retrieval result as SRT text.
///
/// Empty results render as an empty string.
pub fn serialize(result: &RetrievalResult) -> String {
    result
        .segments
        .iter()
        .enumerate()
        .map(|(i, segment)| SrtEntry::from_segment(i + 1, segment).to_string())
        .collect()
}

/// Derive `<title>.srt`, replacing characters file systems reject
pub fn export_filename(title: &str) -> String {
    let cleaned = ILLEGAL_FILENAME_CHARS.replace_all(title.trim(), "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if cleaned.is_empty() {
        format!("{}.srt", DEFAULT_EXPORT_NAME)
    } else {
        format!("{}.srt", cleaned)
    }
}

/// Write subtitles to an SRT file
pub fn write_srt_file<P: AsRef<Path>>(result: &RetrievalResult, path: P) -> Result<()> {
    let path = path.as_ref();

    // Create parent directory if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
    file.write_all(serialize(result).as_bytes())
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

    Ok(())
}
