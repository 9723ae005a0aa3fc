//! Submit-and-poll REST recognition strategy.
//!
//! Three sequential calls against the backend: upload the raw audio, submit a
//! transcription job referencing the upload, then poll the job status until it
//! reaches a terminal state. Cancellation is checked at the top of every poll
//! iteration; an in-flight request is not aborted, only the next iteration is
//! skipped.

use crate::cancel::CancelToken;
use crate::defaults::{POLL_INTERVAL, POLL_TIMEOUT, SEGMENT_FALLBACK_SCORE};
use crate::error::{Result, TubescribeError};
use crate::subtitle::{SubtitleToken, SubtitleTrack};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// One word-level entry in a completed job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WordEntry {
    pub text: String,
    /// Milliseconds from the start of the audio.
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Status response for a transcription job.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub status: String,
    #[serde(default)]
    pub words: Option<Vec<WordEntry>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The REST backend surface: upload, submit, status.
///
/// Kept behind a trait so the poll loop can run against a scripted backend in
/// tests.
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    /// Upload raw audio bytes; returns an opaque upload reference.
    async fn upload(&self, audio: Vec<u8>) -> Result<String>;

    /// Request transcription of an uploaded artifact; returns the job id.
    async fn submit(&self, audio_url: &str) -> Result<String>;

    /// Fetch the current status of a job.
    async fn status(&self, id: &str) -> Result<JobStatus>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

/// Production [`TranscriptApi`] over HTTP.
pub struct HttpTranscriptApi {
    client: reqwest::Client,
    base_url: String,
    speech_model: String,
}

impl HttpTranscriptApi {
    pub fn new(base_url: &str, api_key: &str, speech_model: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(api_key).map_err(|e| TubescribeError::Config {
                message: format!("API key is not a valid header value: {e}"),
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TubescribeError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            speech_model: speech_model.to_string(),
        })
    }
}

fn transport_error(stage: &str, e: reqwest::Error) -> TubescribeError {
    TubescribeError::Transcription {
        cause: format!("{stage} request failed: {e}"),
    }
}

async fn checked(stage: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error response".to_string());
        return Err(TubescribeError::Transcription {
            cause: format!("{stage} failed with status {status}: {body}"),
        });
    }
    Ok(response)
}

#[async_trait]
impl TranscriptApi for HttpTranscriptApi {
    async fn upload(&self, audio: Vec<u8>) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .body(audio)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;

        let parsed: UploadResponse = checked("upload", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("upload", e))?;
        Ok(parsed.upload_url)
    }

    async fn submit(&self, audio_url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .json(&serde_json::json!({
                "audio_url": audio_url,
                "speech_model": self.speech_model,
            }))
            .send()
            .await
            .map_err(|e| transport_error("submit", e))?;

        let parsed: SubmitResponse = checked("submit", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("submit", e))?;
        Ok(parsed.id)
    }

    async fn status(&self, id: &str) -> Result<JobStatus> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| transport_error("status", e))?;

        checked("status", response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("status", e))
    }
}

/// Transcriber that drives a [`TranscriptApi`] job to completion.
pub struct PollingTranscriber<A: TranscriptApi> {
    api: A,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl<A: TranscriptApi> PollingTranscriber<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            poll_interval: POLL_INTERVAL,
            poll_timeout: POLL_TIMEOUT,
        }
    }

    /// Override the poll cadence and deadline.
    pub fn with_timing(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }
}

fn track_from_words(words: &[WordEntry]) -> SubtitleTrack {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| SubtitleToken {
            id: i as u32,
            value: word.text.clone(),
            start_time_ms: word.start,
            end_time_ms: word.end,
            score: word.confidence.unwrap_or(SEGMENT_FALLBACK_SCORE),
        })
        .collect()
}

#[async_trait]
impl<A: TranscriptApi> Transcriber for PollingTranscriber<A> {
    async fn transcribe(&self, audio: &Path, cancel: &CancelToken) -> Result<SubtitleTrack> {
        let bytes = super::read_audio(audio).await?;
        let upload_url = self.api.upload(bytes).await?;
        let job_id = self.api.submit(&upload_url).await?;
        tracing::debug!(job_id, "transcription job submitted");

        let deadline = Instant::now() + self.poll_timeout;
        loop {
            if cancel.is_cancelled() {
                return Err(TubescribeError::transcription_aborted());
            }
            if Instant::now() >= deadline {
                return Err(TubescribeError::Transcription {
                    cause: format!(
                        "job {job_id} did not reach a terminal state within {}",
                        humantime::format_duration(self.poll_timeout)
                    ),
                });
            }

            let status = self.api.status(&job_id).await?;
            match status.status.as_str() {
                "completed" => {
                    return Ok(track_from_words(status.words.as_deref().unwrap_or(&[])));
                }
                "error" => {
                    return Err(TubescribeError::Transcription {
                        cause: status
                            .error
                            .unwrap_or_else(|| "backend reported an error without detail".to_string()),
                    });
                }
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}
