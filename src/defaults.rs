//! Default configuration constants for tubescribe.
//!
//! This module provides shared constants used across the pipeline so policy
//! values live in one place instead of being scattered through call sites.

use std::time::Duration;

/// Prefix for reserved temp file names.
pub const TEMP_PREFIX: &str = "tubescribe";

/// Default audio extraction binary.
///
/// Expected on PATH; overridable via config or `TUBESCRIBE_EXTRACTOR`.
pub const EXTRACTOR_BINARY: &str = "yt-dlp";

/// Offset/duration values from the streaming backend arrive in 100 ns ticks.
/// Dividing by this yields milliseconds.
pub const TICKS_PER_MS: u64 = 10_000;

/// Confidence substituted when the streaming backend reports a segment
/// without a confidence property. Policy constant, not derived.
pub const SEGMENT_FALLBACK_SCORE: f64 = 0.5;

/// Placeholder confidence for single-shot recognition, which reports no
/// confidence at all. Policy constant, not derived.
pub const SINGLE_SHOT_SCORE: f64 = 0.8;

/// Client-side wait for the single result of a single-shot recognition.
pub const SINGLE_SHOT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cadence of status requests while a REST transcription job is pending.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Hard ceiling on total elapsed polling time for one REST job.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Default base URL of the REST recognition backend.
pub const REST_BASE_URL: &str = "https://api.assemblyai.com";

/// Default model requested from the REST backend.
pub const SPEECH_MODEL: &str = "universal";

/// Default recognition language for the streaming backend.
pub const LANGUAGE: &str = "en-US";
