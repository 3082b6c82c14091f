/*!
 * Caption data model and normalization.
 *
 * Providers produce [`RawCaptionItem`]s in whatever precision the upstream
 * uses. [`normalize`] turns them into [`CaptionSegment`]s, the only caption
 * type that crosses the library boundary.
 */

use serde::{Deserialize, Serialize};

/// Provider-native caption record
#[derive(Debug, Clone, PartialEq)]
pub struct RawCaptionItem {
    /// Caption text as delivered
    pub text: String,
    /// Start offset in seconds, possibly fractional
    pub start: f64,
    /// Display duration in seconds
    pub duration: f64,
}

impl RawCaptionItem {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Everything a provider returns for one video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    /// Video title
    pub title: String,
    /// Caption items in source order
    pub items: Vec<RawCaptionItem>,
}

/// A normalized caption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Caption text, unmodified
    pub text: String,
    /// Display label `M:SS`
    #[serde(rename = "timestamp")]
    pub timestamp_label: String,
    /// Start in whole seconds
    pub start: u64,
    /// Duration in seconds
    pub duration: f64,
}

impl CaptionSegment {
    /// End of the segment in seconds
    pub fn end(&self) -> f64 {
        self.start as f64 + self.duration
    }
}

/// Title plus ordered segments of one successful retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub title: String,
    #[serde(rename = "subtitles")]
    pub segments: Vec<CaptionSegment>,
}

impl RetrievalResult {
    pub fn new(title: impl Into<String>, segments: Vec<CaptionSegment>) -> Self {
        Self {
            title: title.into(),
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `M:SS - text` lines, one per segment
    pub fn timestamp_lines(&self) -> Vec<String> {
        self.segments
            .iter()
            .map(|segment| format!("{} - {}", segment.timestamp_label, segment.text))
            .collect()
    }
}

/// Format whole seconds as `M:SS` (minutes unpadded)
pub fn format_timestamp_label(start: u64) -> String {
    format!("{}:{:02}", start / 60, start % 60)
}

/// Floor a provider offset to whole seconds; negative and non-finite values become 0
fn floor_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

fn clamp_duration(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Convert raw items into segments.
///
/// Order is preserved and nothing is dropped, including items whose text is
/// empty or whitespace.
pub fn normalize(items: Vec<RawCaptionItem>) -> Vec<CaptionSegment> {
    items
        .into_iter()
        .map(|item| {
            let start = floor_seconds(item.start);
            CaptionSegment {
                text: item.text,
                timestamp_label: format_timestamp_label(start),
                start,
                duration: clamp_duration(item.duration),
            }
        })
        .collect()
}
