//! tubescribe - timed subtitles from video URLs
//!
//! Validates a watch URL, extracts its audio with yt-dlp into a reserved temp
//! file, sends the WAV to a remote speech-recognition backend, and emits the
//! result as an ordered sequence of timed subtitle tokens.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod cancel;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod subtitle;
pub mod temp;
pub mod transcribe;
pub mod url;

// Core traits (acquire → transcribe → emit)
pub use download::{AudioProvider, YtDlpDownloader};
pub use pipeline::{CollectorProgress, Progress, ProgressSink, StderrProgress};
pub use transcribe::Transcriber;

// Pipeline
pub use pipeline::{Pipeline, PipelineState};

// Error handling
pub use error::{Result, TubescribeError};

// Cancellation
pub use cancel::CancelToken;

// Config
pub use config::{Config, Strategy};

// Data model
pub use subtitle::{SubtitleToken, SubtitleTrack};
pub use url::SourceUrl;

// Recognition strategies
pub use transcribe::rest::{HttpTranscriptApi, PollingTranscriber, TranscriptApi};
pub use transcribe::streaming::{
    RecognitionEvent, SpeechService, SpeechSession, StreamingTranscriber,
};
pub use transcribe::ws::WsSpeechService;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
