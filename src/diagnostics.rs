//! System diagnostics and dependency checking.
//!
//! Backs the `check` subcommand: verifies the extraction binary is runnable
//! and the configured credentials are present before any real run.

use crate::config::{Config, Strategy};
use owo_colors::OwoColorize;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Present and working
    Ok,
    /// Not found
    NotFound,
    /// Found but with issues
    Warning(String),
}

/// Check if a command exists and is executable.
fn check_command(command: &str) -> CheckResult {
    match Command::new(command).arg("--version").output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!("'{}' found but --version failed", command)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

fn report(label: &str, result: &CheckResult, missing_hint: &str) -> bool {
    match result {
        CheckResult::Ok => {
            eprintln!("{} {}", "ok".green(), label);
            true
        }
        CheckResult::NotFound => {
            eprintln!("{} {} — {}", "missing".red(), label, missing_hint);
            false
        }
        CheckResult::Warning(message) => {
            eprintln!("{} {} — {}", "warning".yellow(), label, message);
            true
        }
    }
}

/// Run all checks for the given configuration. Returns true when a real run
/// could proceed.
pub fn run_checks(config: &Config) -> bool {
    let mut ok = true;

    ok &= report(
        &format!("extraction binary ({})", config.download.binary),
        &check_command(&config.download.binary),
        "install yt-dlp or point download.binary at it",
    );

    let credential = if config.speech.api_key.is_empty() {
        CheckResult::NotFound
    } else {
        CheckResult::Ok
    };
    ok &= report(
        "API key",
        &credential,
        "set speech.api_key or TUBESCRIBE_API_KEY",
    );

    if config.speech.strategy == Strategy::Streaming {
        let region = if config.speech.region.is_empty() && config.speech.endpoint.is_none() {
            CheckResult::NotFound
        } else {
            CheckResult::Ok
        };
        ok &= report(
            "streaming region",
            &region,
            "set speech.region or TUBESCRIBE_REGION",
        );
    }

    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_not_found() {
        assert_eq!(
            check_command("definitely-not-a-real-binary-xyz"),
            CheckResult::NotFound
        );
    }

    #[test]
    fn existing_binary_is_ok() {
        // `sh --version` succeeds on anything resembling a POSIX system.
        assert!(matches!(
            check_command("sh"),
            CheckResult::Ok | CheckResult::Warning(_)
        ));
    }

    #[test]
    fn checks_fail_without_credentials() {
        let mut config = Config::default();
        config.download.binary = "sh".to_string();
        assert!(!run_checks(&config));

        config.speech.api_key = "k".to_string();
        assert!(run_checks(&config));
    }
}
