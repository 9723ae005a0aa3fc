//! Command-line interface for tubescribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Timed subtitles from video URLs via remote speech recognition
#[derive(Parser, Debug)]
#[command(
    name = "tubescribe",
    version,
    about = "Timed subtitles from video URLs via remote speech recognition"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video URL to transcribe
    pub url: Option<String>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recognition strategy (streaming, polling)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// Also write the result as an SRT file
    #[arg(long, value_name = "PATH")]
    pub srt: Option<PathBuf>,

    /// Poll cadence for the REST backend. Examples: 3s, 500ms
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub poll_interval: Option<Duration>,

    /// Overall deadline for one REST job. Examples: 20m, 1h
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub poll_timeout: Option<Duration>,
}

/// Parse a duration string.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`, `2h`), and compound (`1h30m`, `2m30s`).
fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check external dependencies and configuration
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_url() {
        let cli = Cli::parse_from(["tubescribe", "https://youtu.be/dQw4w9WgXcQ"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/dQw4w9WgXcQ"));
    }

    #[test]
    fn parses_the_check_subcommand() {
        let cli = Cli::parse_from(["tubescribe", "check"]);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn duration_arg_accepts_bare_seconds_and_units() {
        assert_eq!(parse_duration_arg("3"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration_arg("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration_arg("20m"), Ok(Duration::from_secs(1200)));
        assert!(parse_duration_arg("eventually").is_err());
    }

    #[test]
    fn strategy_and_srt_flags_parse() {
        let cli = Cli::parse_from([
            "tubescribe",
            "--strategy",
            "streaming",
            "--srt",
            "out.srt",
            "https://youtu.be/dQw4w9WgXcQ",
        ]);
        assert_eq!(cli.strategy.as_deref(), Some("streaming"));
        assert_eq!(cli.srt, Some(PathBuf::from("out.srt")));
    }
}
