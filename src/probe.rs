//! WAV artifact probing.
//!
//! Used after a successful download for a diagnostic look at what the
//! extraction tool actually produced. The recognition backend revalidates the
//! audio itself, so a failed probe is informational, not fatal.

use crate::error::{Result, TubescribeError};
use std::path::Path;

/// Basic facts about a WAV artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

/// Read the header of a WAV file and compute its duration.
pub fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path).map_err(|e| TubescribeError::Resource {
        message: format!("cannot probe WAV artifact {}: {e}", path.display()),
    })?;

    let spec = reader.spec();
    // duration() counts inter-channel samples
    let duration_secs = f64::from(reader.duration()) / f64::from(spec.sample_rate);

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs,
    })
}
