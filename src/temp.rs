//! Temporary audio artifact reservation and scoped release.
//!
//! Reservation only picks a unique name inside the system temp directory; the
//! extraction process creates the actual file. The guard deletes the file on
//! drop, so release runs exactly once on every exit path of the scope that
//! owns it — success, failure, or cancellation.

use crate::defaults::TEMP_PREFIX;
use crate::error::{Result, TubescribeError};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Distinguishes reservations made within one process.
static RESERVATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Millisecond timestamp taken at first reservation; distinguishes processes.
static PROCESS_STAMP: LazyLock<u128> = LazyLock::new(|| {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
});

/// A reserved path in the system temp directory, deleted when dropped.
#[derive(Debug)]
pub struct TempWav {
    path: PathBuf,
}

impl TempWav {
    /// Reserve a unique path with the given extension.
    ///
    /// The file is not created. Fails if the temp directory cannot be
    /// resolved to a real (symlink-free) location.
    pub fn reserve(extension: &str) -> Result<Self> {
        let dir = std::env::temp_dir();
        let dir = dir
            .canonicalize()
            .map_err(|e| TubescribeError::Resource {
                message: format!("cannot resolve temp directory {}: {e}", dir.display()),
            })?;
        let seq = RESERVATION_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!("{TEMP_PREFIX}-{}-{seq}.{extension}", *PROCESS_STAMP);
        Ok(Self {
            path: dir.join(name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file at `path` if present.
    ///
    /// A missing file counts as already released. Other deletion failures are
    /// logged and swallowed: release runs on cleanup paths that must not mask
    /// an earlier, more relevant error.
    fn release(path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "leaving temp file behind");
            }
        }
    }
}

impl Drop for TempWav {
    fn drop(&mut self) {
        Self::release(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservations_are_unique() {
        let a = TempWav::reserve("wav").unwrap();
        let b = TempWav::reserve("wav").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn reservation_does_not_create_the_file() {
        let artifact = TempWav::reserve("wav").unwrap();
        assert!(!artifact.path().exists());
    }

    #[test]
    fn path_carries_the_extension() {
        let artifact = TempWav::reserve("wav").unwrap();
        assert_eq!(
            artifact.path().extension().and_then(|e| e.to_str()),
            Some("wav")
        );
    }

    #[test]
    fn drop_removes_a_written_file() {
        let artifact = TempWav::reserve("wav").unwrap();
        let path = artifact.path().to_path_buf();
        std::fs::write(&path, b"RIFF").unwrap();
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn drop_of_a_never_written_file_is_a_no_op() {
        let artifact = TempWav::reserve("wav").unwrap();
        let path = artifact.path().to_path_buf();
        drop(artifact);
        assert!(!path.exists());
    }

    #[test]
    fn releasing_twice_does_not_panic() {
        let artifact = TempWav::reserve("wav").unwrap();
        let path = artifact.path().to_path_buf();
        std::fs::write(&path, b"RIFF").unwrap();
        TempWav::release(&path);
        TempWav::release(&path);
        assert!(!path.exists());
    }
}
