//! Audio acquisition via the external extraction tool.
//!
//! The extraction binary (yt-dlp by default) is a collaborator: we hand it a
//! validated URL and a reserved output path, and its exit code is the whole
//! contract — 0 means the artifact exists at the path.

use crate::cancel::CancelToken;
use crate::error::{Result, TubescribeError};
use crate::probe::probe_wav;
use crate::temp::TempWav;
use crate::url::SourceUrl;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Trait for acquiring a local audio artifact from a validated source URL.
///
/// Returns the owning [`TempWav`] guard, so the caller decides when the
/// artifact is released.
#[async_trait]
pub trait AudioProvider: Send + Sync {
    async fn fetch_audio(&self, url: &SourceUrl, cancel: &CancelToken) -> Result<TempWav>;
}

/// Acquires audio by running the extraction binary against a reserved path.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    binary: String,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl AudioProvider for YtDlpDownloader {
    async fn fetch_audio(&self, url: &SourceUrl, cancel: &CancelToken) -> Result<TempWav> {
        let artifact = TempWav::reserve("wav")?;

        let mut command = Command::new(&self.binary);
        command
            .arg(url.as_str())
            .args(["-x", "--audio-format", "wav", "-o"])
            .arg(artifact.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            // Cancellation drops the output future; take the child with it.
            .kill_on_drop(true);

        let output = tokio::select! {
            output = command.output() => {
                output.map_err(|e| TubescribeError::Download {
                    cause: format!("failed to run {}: {e}", self.binary),
                })?
            }
            _ = cancel.cancelled() => {
                return Err(TubescribeError::download_aborted());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or("").trim();
            let cause = match output.status.code() {
                Some(code) if detail.is_empty() => {
                    format!("{} exited with status {code}", self.binary)
                }
                Some(code) => format!("{} exited with status {code}: {detail}", self.binary),
                None => format!("{} was terminated by a signal", self.binary),
            };
            return Err(TubescribeError::Download { cause });
        }

        match probe_wav(artifact.path()) {
            Ok(info) => tracing::debug!(
                path = %artifact.path().display(),
                duration_secs = info.duration_secs,
                sample_rate = info.sample_rate,
                "audio artifact ready"
            ),
            Err(e) => tracing::debug!(error = %e, "artifact probe failed"),
        }

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_url() -> SourceUrl {
        SourceUrl::parse("https://youtu.be/dQw4w9WgXcQ").unwrap()
    }

    /// Write a stand-in extraction script so tests control the exit behavior.
    fn fake_extractor(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("fake-extractor");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn zero_exit_resolves_with_the_reserved_path() {
        let dir = tempfile::tempdir().unwrap();
        // Mimics the collaborator: last argument is the output path.
        let downloader = fake_extractor(dir.path(), r#"touch "$6"; exit 0"#);

        let artifact = YtDlpDownloader::new(downloader)
            .fetch_audio(&test_url(), &CancelToken::new())
            .await
            .unwrap();

        assert!(artifact.path().exists());
        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn nonzero_exit_carries_the_code() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = fake_extractor(dir.path(), "exit 7");

        let result = YtDlpDownloader::new(downloader)
            .fetch_audio(&test_url(), &CancelToken::new())
            .await;

        let Err(TubescribeError::Download { cause }) = result else {
            panic!("expected download error");
        };
        assert!(cause.contains("status 7"), "got: {cause}");
    }

    #[tokio::test]
    async fn missing_binary_is_a_download_error() {
        let result = YtDlpDownloader::new("definitely-not-a-real-binary-xyz")
            .fetch_audio(&test_url(), &CancelToken::new())
            .await;

        assert!(matches!(result, Err(TubescribeError::Download { .. })));
    }

    #[tokio::test]
    async fn cancellation_aborts_the_wait() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = fake_extractor(dir.path(), "sleep 10");
        let cancel = CancelToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let result = YtDlpDownloader::new(downloader)
            .fetch_audio(&test_url(), &cancel)
            .await;

        let Err(TubescribeError::Download { cause }) = result else {
            panic!("expected download error");
        };
        assert_eq!(cause, TubescribeError::ABORTED);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
