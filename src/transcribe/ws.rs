//! Websocket speech session backend.
//!
//! Production [`SpeechService`] for the streaming strategy: raw WAV bytes go
//! out as binary frames (an empty binary frame marks end of audio) and the
//! service's JSON text frames come back as [`RecognitionEvent`]s.

use crate::error::{Result, TubescribeError};
use crate::transcribe::streaming::{RecognitionEvent, SpeechService, SpeechSession};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Streaming recognition backend reachable over a websocket endpoint.
pub struct WsSpeechService {
    endpoint: String,
    api_key: String,
}

impl WsSpeechService {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self { endpoint, api_key }
    }

    /// Conversational recognition endpoint for a service region.
    pub fn endpoint_for_region(region: &str, language: &str) -> String {
        format!(
            "wss://{region}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1?language={language}&format=detailed"
        )
    }
}

#[async_trait]
impl SpeechService for WsSpeechService {
    async fn start_session(&self) -> Result<Box<dyn SpeechSession>> {
        let mut request =
            self.endpoint
                .as_str()
                .into_client_request()
                .map_err(|e| TubescribeError::Transcription {
                    cause: format!("invalid speech endpoint {}: {e}", self.endpoint),
                })?;
        request.headers_mut().insert(
            "Ocp-Apim-Subscription-Key",
            HeaderValue::from_str(&self.api_key).map_err(|e| TubescribeError::Config {
                message: format!("API key is not a valid header value: {e}"),
            })?,
        );

        let (socket, _response) =
            connect_async(request)
                .await
                .map_err(|e| TubescribeError::Transcription {
                    cause: format!("cannot reach speech endpoint: {e}"),
                })?;

        Ok(Box::new(WsSpeechSession { socket }))
    }
}

struct WsSpeechSession {
    socket: WsStream,
}

#[async_trait]
impl SpeechSession for WsSpeechSession {
    async fn push_audio(&mut self, chunk: &[u8]) -> Result<()> {
        self.socket
            .send(Message::Binary(Bytes::copy_from_slice(chunk)))
            .await
            .map_err(|e| TubescribeError::Transcription {
                cause: format!("failed to push audio: {e}"),
            })
    }

    async fn finish_audio(&mut self) -> Result<()> {
        // Zero-length audio frame signals end of stream.
        self.socket
            .send(Message::Binary(Bytes::new()))
            .await
            .map_err(|e| TubescribeError::Transcription {
                cause: format!("failed to close audio stream: {e}"),
            })
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        while let Some(frame) = self.socket.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Some(event) = event_from_frame(text.as_str()) {
                        return Some(event);
                    }
                    // Frames we don't understand (turn bookkeeping etc.) are skipped.
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(RecognitionEvent::Canceled {
                        reason: format!("websocket transport error: {e}"),
                    });
                }
            }
        }
        None
    }

    async fn stop(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            tracing::debug!(error = %e, "websocket close failed");
        }
    }
}

/// One phrase frame from the service.
#[derive(Debug, Deserialize)]
struct PhraseFrame {
    #[serde(rename = "RecognitionStatus")]
    recognition_status: String,
    #[serde(rename = "DisplayText", default)]
    display_text: Option<String>,
    #[serde(rename = "Offset", default)]
    offset: Option<u64>,
    #[serde(rename = "Duration", default)]
    duration: Option<u64>,
    #[serde(rename = "NBest", default)]
    n_best: Option<Vec<NBestEntry>>,
}

#[derive(Debug, Deserialize)]
struct NBestEntry {
    #[serde(rename = "Confidence", default)]
    confidence: Option<f64>,
}

/// Map a JSON text frame onto an event. `None` means "not a phrase frame".
fn event_from_frame(text: &str) -> Option<RecognitionEvent> {
    let frame: PhraseFrame = serde_json::from_str(text).ok()?;
    match frame.recognition_status.as_str() {
        "Success" => Some(RecognitionEvent::Recognized {
            text: frame.display_text.unwrap_or_default(),
            offset_ticks: frame.offset.unwrap_or(0),
            duration_ticks: frame.duration.unwrap_or(0),
            confidence: frame
                .n_best
                .as_ref()
                .and_then(|n| n.first())
                .and_then(|entry| entry.confidence),
        }),
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => {
            Some(RecognitionEvent::NoMatch {
                reason: frame.recognition_status,
            })
        }
        "EndOfDictation" => Some(RecognitionEvent::SessionStopped),
        _ => Some(RecognitionEvent::Canceled {
            reason: frame.recognition_status,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_frame_becomes_recognized() {
        let event = event_from_frame(
            r#"{"RecognitionStatus":"Success","DisplayText":"hello","Offset":1800000,"Duration":4900000,"NBest":[{"Confidence":0.91}]}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            RecognitionEvent::Recognized {
                text: "hello".to_string(),
                offset_ticks: 1_800_000,
                duration_ticks: 4_900_000,
                confidence: Some(0.91),
            }
        );
    }

    #[test]
    fn success_frame_without_nbest_has_no_confidence() {
        let event = event_from_frame(
            r#"{"RecognitionStatus":"Success","DisplayText":"hm","Offset":0,"Duration":100}"#,
        )
        .unwrap();
        let RecognitionEvent::Recognized { confidence, .. } = event else {
            panic!("expected recognized");
        };
        assert!(confidence.is_none());
    }

    #[test]
    fn end_of_dictation_becomes_session_stopped() {
        assert_eq!(
            event_from_frame(r#"{"RecognitionStatus":"EndOfDictation","Offset":0,"Duration":0}"#),
            Some(RecognitionEvent::SessionStopped)
        );
    }

    #[test]
    fn no_match_keeps_the_reason_code() {
        assert_eq!(
            event_from_frame(r#"{"RecognitionStatus":"InitialSilenceTimeout"}"#),
            Some(RecognitionEvent::NoMatch {
                reason: "InitialSilenceTimeout".to_string()
            })
        );
    }

    #[test]
    fn unknown_status_becomes_canceled() {
        assert_eq!(
            event_from_frame(r#"{"RecognitionStatus":"TooManyRequests"}"#),
            Some(RecognitionEvent::Canceled {
                reason: "TooManyRequests".to_string()
            })
        );
    }

    #[test]
    fn non_phrase_frames_are_skipped() {
        assert_eq!(event_from_frame("not json"), None);
        assert_eq!(event_from_frame(r#"{"turn":"start"}"#), None);
    }

    #[test]
    fn region_endpoint_is_wss() {
        let endpoint = WsSpeechService::endpoint_for_region("westeurope", "en-US");
        assert!(endpoint.starts_with("wss://westeurope."));
        assert!(endpoint.contains("language=en-US"));
    }
}
