//! Streaming event-based recognition strategy.
//!
//! The backend session is an audio sink plus a stream of typed events. One
//! collector loop appends recognized segments and stops at the first terminal
//! event (session stopped, backend cancel, or caller cancellation). The
//! websocket production backend lives in [`crate::transcribe::ws`].

use crate::cancel::CancelToken;
use crate::defaults::{
    SEGMENT_FALLBACK_SCORE, SINGLE_SHOT_SCORE, SINGLE_SHOT_TIMEOUT, TICKS_PER_MS,
};
use crate::error::{Result, TubescribeError};
use crate::subtitle::{SubtitleToken, SubtitleTrack};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use std::path::Path;

/// Events emitted by a recognition session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// One finalized utterance segment.
    Recognized {
        text: String,
        /// Offset from audio start, in 100 ns ticks.
        offset_ticks: u64,
        /// Segment duration, in 100 ns ticks.
        duration_ticks: u64,
        /// Absent when the backend reports no confidence for the segment.
        confidence: Option<f64>,
    },
    /// The backend heard nothing it could match.
    NoMatch { reason: String },
    /// Recognition finished; terminal.
    SessionStopped,
    /// The backend errored out or cancelled the session; terminal.
    Canceled { reason: String },
}

/// One live recognition session.
#[async_trait]
pub trait SpeechSession: Send {
    /// Push raw audio bytes into the session's input stream.
    async fn push_audio(&mut self, chunk: &[u8]) -> Result<()>;

    /// Signal end of audio.
    async fn finish_audio(&mut self) -> Result<()>;

    /// Next event, or `None` once the backend closed the stream.
    async fn next_event(&mut self) -> Option<RecognitionEvent>;

    /// Stop recognition early. Best-effort; used on cancellation and teardown.
    async fn stop(&mut self);
}

/// Factory for recognition sessions.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn start_session(&self) -> Result<Box<dyn SpeechSession>>;
}

/// Transcriber backed by a streaming recognition session.
pub struct StreamingTranscriber<S: SpeechService> {
    service: S,
}

impl<S: SpeechService> StreamingTranscriber<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Open a session and feed it the whole artifact, EOF included.
    async fn open_and_feed(&self, audio: &Path) -> Result<Box<dyn SpeechSession>> {
        let bytes = super::read_audio(audio).await?;
        let mut session = self.service.start_session().await?;
        session.push_audio(&bytes).await?;
        session.finish_audio().await?;
        Ok(session)
    }

    /// Single-shot recognition: expect exactly one result event.
    ///
    /// The backend reports no confidence in this mode, so the resulting token
    /// carries the fixed placeholder score.
    pub async fn recognize_once(&self, audio: &Path, cancel: &CancelToken) -> Result<SubtitleTrack> {
        let mut session = self.open_and_feed(audio).await?;

        let event = tokio::select! {
            _ = cancel.cancelled() => {
                session.stop().await;
                return Err(TubescribeError::transcription_aborted());
            }
            event = tokio::time::timeout(SINGLE_SHOT_TIMEOUT, session.next_event()) => {
                match event {
                    Ok(event) => event,
                    Err(_) => {
                        session.stop().await;
                        return Err(TubescribeError::Transcription {
                            cause: format!(
                                "no recognition result within {}s",
                                SINGLE_SHOT_TIMEOUT.as_secs()
                            ),
                        });
                    }
                }
            }
        };
        session.stop().await;

        match event {
            Some(RecognitionEvent::Recognized {
                text,
                offset_ticks,
                duration_ticks,
                ..
            }) => Ok(vec![segment_token(
                0,
                text,
                offset_ticks,
                duration_ticks,
                SINGLE_SHOT_SCORE,
            )]),
            Some(RecognitionEvent::NoMatch { reason })
            | Some(RecognitionEvent::Canceled { reason }) => {
                Err(TubescribeError::Transcription { cause: reason })
            }
            Some(RecognitionEvent::SessionStopped) | None => {
                Err(TubescribeError::Transcription {
                    cause: "session ended without a recognition result".to_string(),
                })
            }
        }
    }
}

fn segment_token(
    id: u32,
    text: String,
    offset_ticks: u64,
    duration_ticks: u64,
    score: f64,
) -> SubtitleToken {
    SubtitleToken {
        id,
        value: text,
        start_time_ms: offset_ticks / TICKS_PER_MS,
        end_time_ms: (offset_ticks + duration_ticks) / TICKS_PER_MS,
        score,
    }
}

#[async_trait]
impl<S: SpeechService> Transcriber for StreamingTranscriber<S> {
    async fn transcribe(&self, audio: &Path, cancel: &CancelToken) -> Result<SubtitleTrack> {
        let mut session = self.open_and_feed(audio).await?;
        let mut tokens: SubtitleTrack = Vec::new();

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    session.stop().await;
                    // Collected segments are discarded, not returned.
                    return Err(TubescribeError::transcription_aborted());
                }
                event = session.next_event() => event,
            };

            match event {
                Some(RecognitionEvent::Recognized {
                    text,
                    offset_ticks,
                    duration_ticks,
                    confidence,
                }) => {
                    let id = tokens.len() as u32;
                    let score = confidence.unwrap_or(SEGMENT_FALLBACK_SCORE);
                    tokens.push(segment_token(id, text, offset_ticks, duration_ticks, score));
                }
                Some(RecognitionEvent::NoMatch { .. }) => {}
                Some(RecognitionEvent::SessionStopped) => {
                    session.stop().await;
                    return Ok(tokens);
                }
                Some(RecognitionEvent::Canceled { reason }) => {
                    return Err(TubescribeError::Transcription { cause: reason });
                }
                None => {
                    return Err(TubescribeError::Transcription {
                        cause: "recognition stream closed before the session stopped".to_string(),
                    });
                }
            }
        }
    }
}

/// Scripted session/service for tests: replays a fixed event sequence.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpeechService {
    events: Vec<RecognitionEvent>,
    /// When true, the session blocks forever once the script runs dry instead
    /// of reporting a closed stream.
    hang_when_empty: bool,
}

impl ScriptedSpeechService {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            hang_when_empty: false,
        }
    }

    pub fn hanging(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            hang_when_empty: true,
        }
    }
}

struct ScriptedSession {
    events: std::collections::VecDeque<RecognitionEvent>,
    hang_when_empty: bool,
    finished: bool,
}

#[async_trait]
impl SpeechSession for ScriptedSession {
    async fn push_audio(&mut self, _chunk: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn finish_audio(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        // Events only flow once the audio stream was closed, like the real
        // backend after a short utterance.
        if !self.finished {
            return Some(RecognitionEvent::Canceled {
                reason: "audio stream was not closed".to_string(),
            });
        }
        match self.events.pop_front() {
            Some(event) => Some(event),
            None if self.hang_when_empty => std::future::pending().await,
            None => None,
        }
    }

    async fn stop(&mut self) {}
}

#[async_trait]
impl SpeechService for ScriptedSpeechService {
    async fn start_session(&self) -> Result<Box<dyn SpeechSession>> {
        Ok(Box::new(ScriptedSession {
            events: self.events.clone().into(),
            hang_when_empty: self.hang_when_empty,
            finished: false,
        }))
    }
}
