//! Subtitle token model and output rendering.

use serde::{Deserialize, Serialize};
use srtlib::{Subtitle, Timestamp};

/// One recognized utterance segment.
///
/// `id` is assigned by output order (0-based), not by time; backends are not
/// structurally prevented from reporting segments out of chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleToken {
    pub id: u32,
    /// Recognized text; may be empty for a zero-confidence segment.
    pub value: String,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    /// Confidence in [0.0, 1.0].
    pub score: f64,
}

/// Ordered token sequence for one audio artifact.
pub type SubtitleTrack = Vec<SubtitleToken>;

/// Render a track as a pretty-printed JSON array.
pub fn to_json(track: &SubtitleTrack) -> serde_json::Result<String> {
    serde_json::to_string_pretty(track)
}

/// Convert a track to SRT subtitles.
///
/// SRT numbering is 1-based, so entry numbers are `id + 1`.
pub fn to_subtitles(track: &SubtitleTrack) -> Vec<Subtitle> {
    track
        .iter()
        .map(|token| {
            Subtitle::new(
                token.id as usize + 1,
                ms_to_timestamp(token.start_time_ms),
                ms_to_timestamp(token.end_time_ms),
                token.value.clone(),
            )
        })
        .collect()
}

/// Format subtitles as SRT file content.
pub fn display_subtitles(subtitles: &[Subtitle]) -> String {
    subtitles
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn ms_to_timestamp(ms: u64) -> Timestamp {
    Timestamp::from_milliseconds(ms as u32)
}
