//! Pipeline orchestration: validate → acquire → transcribe → emit.
//!
//! One invocation runs each stage exactly once; there is no retry loop. The
//! pipeline owns the temp artifact guard across transcription, so the file is
//! released after the transcriber is done with it on every exit path.

use crate::cancel::CancelToken;
use crate::download::AudioProvider;
use crate::error::Result;
use crate::subtitle::SubtitleTrack;
use crate::transcribe::Transcriber;
use crate::url::SourceUrl;
use std::path::PathBuf;
use std::sync::Mutex;

/// Events on the informational progress channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Processing { url: String },
    Downloaded { path: PathBuf },
}

/// Pluggable progress output. Informational only; never affects control flow.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, progress: &Progress);
}

/// Implement ProgressSink for Arc<S> so callers can keep a handle on a sink
/// they hand to the pipeline.
impl<S: ProgressSink + ?Sized> ProgressSink for std::sync::Arc<S> {
    fn notify(&self, progress: &Progress) {
        (**self).notify(progress)
    }
}

/// Writes progress lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrProgress {
    quiet: bool,
}

impl StderrProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressSink for StderrProgress {
    fn notify(&self, progress: &Progress) {
        if self.quiet {
            return;
        }
        match progress {
            Progress::Processing { url } => eprintln!("Processing URL {url}"),
            Progress::Downloaded { path } => {
                eprintln!("Audio downloaded to {}", path.display());
            }
        }
    }
}

/// Collects progress events for inspection in tests.
#[derive(Debug, Default)]
pub struct CollectorProgress {
    events: Mutex<Vec<Progress>>,
}

impl CollectorProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Progress> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProgressSink for CollectorProgress {
    fn notify(&self, progress: &Progress) {
        if let Ok(mut events) = self.events.lock() {
            events.push(progress.clone());
        }
    }
}

/// Invocation states. Terminal states are `Done` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Validating,
    Acquiring,
    Transcribing,
    Done,
    Failed,
}

/// Sequences acquisition and transcription over injected stage implementations.
pub struct Pipeline<P: AudioProvider, T: Transcriber, S: ProgressSink> {
    provider: P,
    transcriber: T,
    progress: S,
    state: Mutex<PipelineState>,
}

impl<P: AudioProvider, T: Transcriber, S: ProgressSink> Pipeline<P, T, S> {
    pub fn new(provider: P, transcriber: T, progress: S) -> Self {
        Self {
            provider,
            transcriber,
            progress,
            state: Mutex::new(PipelineState::Validating),
        }
    }

    /// Last observed state; for diagnostics and tests.
    pub fn state(&self) -> PipelineState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(PipelineState::Failed)
    }

    fn enter(&self, state: PipelineState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
        tracing::debug!(?state, "pipeline state");
    }

    /// Run one invocation: validate the URL, acquire audio, transcribe it.
    pub async fn run(&self, raw_url: &str, cancel: &CancelToken) -> Result<SubtitleTrack> {
        self.enter(PipelineState::Validating);
        let url = match SourceUrl::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                self.enter(PipelineState::Failed);
                return Err(e);
            }
        };
        self.progress.notify(&Progress::Processing {
            url: url.to_string(),
        });

        self.enter(PipelineState::Acquiring);
        let artifact = match self.provider.fetch_audio(&url, cancel).await {
            Ok(artifact) => artifact,
            Err(e) => {
                self.enter(PipelineState::Failed);
                return Err(e);
            }
        };
        self.progress.notify(&Progress::Downloaded {
            path: artifact.path().to_path_buf(),
        });

        self.enter(PipelineState::Transcribing);
        let result = self.transcriber.transcribe(artifact.path(), cancel).await;
        // The guard outlives the transcription read; releasing here covers
        // success and failure alike.
        drop(artifact);

        match result {
            Ok(track) => {
                self.enter(PipelineState::Done);
                Ok(track)
            }
            Err(e) => {
                self.enter(PipelineState::Failed);
                Err(e)
            }
        }
    }
}
