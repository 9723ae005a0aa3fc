//! Error types for tubescribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TubescribeError {
    // Input validation
    #[error("invalid video URL: {url}")]
    InvalidUrl { url: String },

    // Audio acquisition
    #[error("audio download failed: {cause}")]
    Download { cause: String },

    // Remote recognition
    #[error("transcription failed: {cause}")]
    Transcription { cause: String },

    // Temp artifact handling
    #[error("temp resource error: {message}")]
    Resource { message: String },

    // Startup configuration
    #[error("configuration error: {message}")]
    Config { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TubescribeError {
    /// Marker cause used when a stage observes cooperative cancellation.
    pub const ABORTED: &'static str = "aborted";

    /// Download failure caused by caller cancellation.
    pub fn download_aborted() -> Self {
        TubescribeError::Download {
            cause: Self::ABORTED.to_string(),
        }
    }

    /// Transcription failure caused by caller cancellation.
    pub fn transcription_aborted() -> Self {
        TubescribeError::Transcription {
            cause: Self::ABORTED.to_string(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, TubescribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let error = TubescribeError::InvalidUrl {
            url: "ftp://nope".to_string(),
        };
        assert_eq!(error.to_string(), "invalid video URL: ftp://nope");
    }

    #[test]
    fn download_display_carries_cause() {
        let error = TubescribeError::Download {
            cause: "yt-dlp exited with status 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "audio download failed: yt-dlp exited with status 1"
        );
    }

    #[test]
    fn aborted_constructors_use_marker() {
        assert!(
            TubescribeError::download_aborted()
                .to_string()
                .contains("aborted")
        );
        assert!(
            TubescribeError::transcription_aborted()
                .to_string()
                .contains("aborted")
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: TubescribeError = io.into();
        assert!(matches!(error, TubescribeError::Io(_)));
    }
}
