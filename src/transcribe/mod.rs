//! Remote speech recognition strategies.
//!
//! Two interchangeable strategies produce the same [`SubtitleTrack`]: a
//! streaming event recognizer ([`streaming::StreamingTranscriber`]) and a
//! submit-and-poll REST recognizer ([`rest::PollingTranscriber`]). Both read
//! the whole audio artifact into memory before submission; neither retries a
//! failed call.

pub mod rest;
pub mod streaming;
pub mod ws;

use crate::cancel::CancelToken;
use crate::error::{Result, TubescribeError};
use crate::subtitle::SubtitleTrack;
use async_trait::async_trait;
use std::path::Path;

/// Trait for turning a completed audio artifact into timed subtitle tokens.
///
/// This trait allows swapping recognition protocols (and mocking the whole
/// stage in tests) without touching the pipeline.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio`.
    ///
    /// Honors `cancel` at suspension points; a cancelled call fails with a
    /// transcription error, it never returns partial results.
    async fn transcribe(&self, audio: &Path, cancel: &CancelToken) -> Result<SubtitleTrack>;
}

/// Read the whole artifact into memory for submission.
pub(crate) async fn read_audio(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| TubescribeError::Transcription {
            cause: format!("cannot read audio artifact {}: {e}", path.display()),
        })
}

/// Mock transcriber for tests and wiring checks.
#[derive(Debug, Clone, Default)]
pub struct MockTranscriber {
    track: SubtitleTrack,
    should_fail: bool,
}

impl MockTranscriber {
    /// Mock that resolves with the given track.
    pub fn new(track: SubtitleTrack) -> Self {
        Self {
            track,
            should_fail: false,
        }
    }

    /// Mock that always fails.
    pub fn failing() -> Self {
        Self {
            track: Vec::new(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &Path, cancel: &CancelToken) -> Result<SubtitleTrack> {
        if cancel.is_cancelled() {
            return Err(TubescribeError::transcription_aborted());
        }
        if self.should_fail {
            return Err(TubescribeError::Transcription {
                cause: "mock failure".to_string(),
            });
        }
        Ok(self.track.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::SubtitleToken;

    fn one_token() -> SubtitleTrack {
        vec![SubtitleToken {
            id: 0,
            value: "mock".to_string(),
            start_time_ms: 0,
            end_time_ms: 10,
            score: 1.0,
        }]
    }

    #[tokio::test]
    async fn mock_returns_its_track() {
        let mock = MockTranscriber::new(one_token());
        let track = mock
            .transcribe(Path::new("/nonexistent.wav"), &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(track, one_token());
    }

    #[tokio::test]
    async fn failing_mock_fails() {
        let mock = MockTranscriber::failing();
        let result = mock
            .transcribe(Path::new("/nonexistent.wav"), &CancelToken::new())
            .await;
        assert!(matches!(
            result,
            Err(TubescribeError::Transcription { .. })
        ));
    }

    #[tokio::test]
    async fn read_audio_maps_missing_file_to_transcription_error() {
        let result = read_audio(Path::new("/definitely/not/here.wav")).await;
        assert!(matches!(
            result,
            Err(TubescribeError::Transcription { .. })
        ));
    }
}
