//! Configuration loading: TOML file, environment overrides, CLI overrides.
//!
//! Credentials are resolved once at startup and passed into the stage
//! constructors; a missing credential is a configuration failure before any
//! pipeline work starts, never a per-call error.

use crate::defaults;
use crate::error::{Result, TubescribeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub speech: SpeechConfig,
    pub download: DownloadConfig,
}

/// Recognition backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// Backend credential. Required for both strategies.
    pub api_key: String,
    /// Service region for the streaming backend (e.g. "westeurope").
    pub region: String,
    /// Full streaming endpoint override; derived from the region when unset.
    pub endpoint: Option<String>,
    /// Recognition language for the streaming backend.
    pub language: String,
    pub strategy: Strategy,
    /// Base URL of the REST backend.
    pub base_url: String,
    /// Model requested from the REST backend.
    pub speech_model: String,
}

/// Audio extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadConfig {
    /// Extraction binary name or path.
    pub binary: String,
}

/// Recognition strategy selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Streaming event recognizer (websocket session).
    Streaming,
    /// Submit-and-poll REST recognizer.
    #[default]
    Polling,
}

impl FromStr for Strategy {
    type Err = TubescribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "streaming" => Ok(Strategy::Streaming),
            "polling" | "rest" => Ok(Strategy::Polling),
            other => Err(TubescribeError::Config {
                message: format!("unknown strategy '{other}' (expected streaming or polling)"),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Streaming => f.write_str("streaming"),
            Strategy::Polling => f.write_str("polling"),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            region: String::new(),
            endpoint: None,
            language: defaults::LANGUAGE.to_string(),
            strategy: Strategy::default(),
            base_url: defaults::REST_BASE_URL.to_string(),
            speech_model: defaults::SPEECH_MODEL.to_string(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            binary: defaults::EXTRACTOR_BINARY.to_string(),
        }
    }
}

impl Config {
    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tubescribe").join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// Missing fields use default values; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| TubescribeError::Config {
            message: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Load from an explicit path, or from the default location, or defaults
    /// if no file exists. An explicit path that is missing is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - TUBESCRIBE_API_KEY → speech.api_key
    /// - TUBESCRIBE_REGION → speech.region
    /// - TUBESCRIBE_STRATEGY → speech.strategy
    /// - TUBESCRIBE_EXTRACTOR → download.binary
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("TUBESCRIBE_API_KEY")
            && !key.is_empty()
        {
            self.speech.api_key = key;
        }
        if let Ok(region) = std::env::var("TUBESCRIBE_REGION")
            && !region.is_empty()
        {
            self.speech.region = region;
        }
        if let Ok(strategy) = std::env::var("TUBESCRIBE_STRATEGY")
            && let Ok(strategy) = strategy.parse()
        {
            self.speech.strategy = strategy;
        }
        if let Ok(binary) = std::env::var("TUBESCRIBE_EXTRACTOR")
            && !binary.is_empty()
        {
            self.download.binary = binary;
        }
        self
    }

    /// Check that the selected strategy can be constructed from this config.
    pub fn validate(&self) -> Result<()> {
        if self.speech.api_key.is_empty() {
            return Err(TubescribeError::Config {
                message: "no API key configured (set speech.api_key or TUBESCRIBE_API_KEY)"
                    .to_string(),
            });
        }
        if self.speech.strategy == Strategy::Streaming
            && self.speech.region.is_empty()
            && self.speech.endpoint.is_none()
        {
            return Err(TubescribeError::Config {
                message:
                    "the streaming strategy needs speech.region (or an explicit speech.endpoint)"
                        .to_string(),
            });
        }
        Ok(())
    }

    /// Streaming endpoint: explicit override, or derived from the region.
    pub fn streaming_endpoint(&self) -> String {
        self.speech.endpoint.clone().unwrap_or_else(|| {
            crate::transcribe::ws::WsSpeechService::endpoint_for_region(
                &self.speech.region,
                &self.speech.language,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.download.binary, "yt-dlp");
        assert_eq!(config.speech.strategy, Strategy::Polling);
        assert_eq!(config.speech.base_url, defaults::REST_BASE_URL);
        assert!(config.speech.api_key.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [speech]
            api_key = "k"
            strategy = "streaming"
            region = "westeurope"
            "#,
        )
        .unwrap();
        assert_eq!(config.speech.api_key, "k");
        assert_eq!(config.speech.strategy, Strategy::Streaming);
        assert_eq!(config.download.binary, "yt-dlp");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(TubescribeError::Config { .. })
        ));
    }

    #[test]
    fn strategy_parses_from_str() {
        assert_eq!("streaming".parse::<Strategy>().unwrap(), Strategy::Streaming);
        assert_eq!("POLLING".parse::<Strategy>().unwrap(), Strategy::Polling);
        assert_eq!("rest".parse::<Strategy>().unwrap(), Strategy::Polling);
        assert!("carrier-pigeon".parse::<Strategy>().is_err());
    }

    #[test]
    fn validate_requires_an_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(TubescribeError::Config { .. })
        ));
    }

    #[test]
    fn validate_requires_a_region_for_streaming() {
        let mut config = Config::default();
        config.speech.api_key = "k".to_string();
        config.speech.strategy = Strategy::Streaming;
        assert!(config.validate().is_err());

        config.speech.region = "westeurope".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_override_wins_over_the_region() {
        let mut config = Config::default();
        config.speech.endpoint = Some("wss://localhost:9000/speech".to_string());
        assert_eq!(config.streaming_endpoint(), "wss://localhost:9000/speech");

        config.speech.endpoint = None;
        config.speech.region = "westeurope".to_string();
        assert!(config.streaming_endpoint().contains("westeurope"));
    }

    #[test]
    fn env_overrides_apply() {
        // Env vars are process-global; keep every env assertion in one test.
        unsafe {
            std::env::set_var("TUBESCRIBE_API_KEY", "env-key");
            std::env::set_var("TUBESCRIBE_STRATEGY", "streaming");
        }
        let config = Config::default().with_env_overrides();
        assert_eq!(config.speech.api_key, "env-key");
        assert_eq!(config.speech.strategy, Strategy::Streaming);
        unsafe {
            std::env::remove_var("TUBESCRIBE_API_KEY");
            std::env::remove_var("TUBESCRIBE_STRATEGY");
        }
    }
}
