//! Watch-URL validation.
//!
//! URLs are validated exactly once, before any resource is touched. A
//! [`SourceUrl`] is opaque afterwards; downstream stages never re-validate.

use crate::error::{Result, TubescribeError};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Accepted watch-URL shape: `youtube.com/watch?v=` or `youtu.be/` followed by
/// an 11-character video id. Trailing query parameters are allowed.
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: hardcoded pattern — always valid
    #[allow(clippy::expect_used)]
    Regex::new(r"^https?://(www\.)?(youtube\.com/watch\?v=|youtu\.be/)[A-Za-z0-9_-]{11}.*$")
        .expect("hardcoded video URL pattern")
});

/// A validated watch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl(String);

impl SourceUrl {
    /// Validate a raw string against the watch-URL grammar.
    pub fn parse(raw: &str) -> Result<Self> {
        if VIDEO_URL.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(TubescribeError::InvalidUrl {
                url: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
