//! Centralized configuration and constants for the application.

use clap::{ArgAction, Parser};
use log::LevelFilter;
use pinpad_core::{Style, StyleError, StyleOverrides};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application information constants.
pub mod app_info {
    pub const NAME: &str = "pinpad";
    pub const ID: &str = "io.github.pinpad";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const RESOURCE_PREFIX: &str = "/io/github/pinpad";
}

/// Biometric timing.
pub mod biometric {
    use super::Duration;

    /// Upper bound on one fingerprint verification.
    pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

    /// How often the UI thread polls for results from the runtime.
    pub const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// fprintd finger selector meaning "any enrolled finger".
    pub const ANY_FINGER: &str = "any";

    /// Shown while waiting for a fingerprint unless the host sets its own.
    pub const DEFAULT_REASON: &str = "Touch to unlock";
}

/// Longest passcode the panel accepts.
pub const MAX_PASSCODE_LENGTH: u8 = 12;

/// Pause after a successful unlock before the demo resets the panel.
pub const UNLOCKED_RESET_DELAY: Duration = Duration::from_millis(1500);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Passcode must be exactly {expected} digits, got {actual}")]
    PasscodeLength { expected: usize, actual: usize },

    #[error("Passcode must contain only digits")]
    NonNumeric,

    #[error("Failed to read style file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid style file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Style(#[from] StyleError),
}

/// pinpad - passcode entry panel with fingerprint unlock
#[derive(Parser, Debug, Clone)]
#[command(name = app_info::NAME, version, about)]
pub struct Args {
    /// Number of digits in the passcode
    #[arg(
        short,
        long,
        default_value_t = 4,
        value_parser = clap::value_parser!(u8).range(1..=MAX_PASSCODE_LENGTH as i64)
    )]
    pub length: u8,

    /// Passcode the demo accepts
    #[arg(long, env = "PINPAD_PASSCODE", default_value = "1234", hide_env_values = true)]
    pub passcode: String,

    /// Use the white-on-clear palette
    #[arg(long)]
    pub vibrancy: bool,

    /// Hide the fingerprint control
    #[arg(long)]
    pub no_biometric: bool,

    /// JSON file with style overrides
    #[arg(long, value_name = "FILE")]
    pub style: Option<PathBuf>,

    /// Reason shown while waiting for a fingerprint
    #[arg(long, default_value = biometric::DEFAULT_REASON)]
    pub reason: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Check the passcode against the configured length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.passcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::NonNumeric);
        }
        let actual = self.passcode.chars().count();
        let expected = usize::from(self.length);
        if actual != expected {
            return Err(ConfigError::PasscodeLength { expected, actual });
        }
        Ok(())
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Style from the optional file, with the `--vibrancy` flag applied on top.
    pub fn resolve_style(&self) -> Result<Style, ConfigError> {
        let style = match &self.style {
            Some(path) => load_style(path)?,
            None => Style::default(),
        };
        if self.vibrancy {
            Ok(style.with_vibrancy(true))
        } else {
            Ok(style)
        }
    }
}

/// Read a JSON style file.
pub fn load_style(path: &Path) -> Result<Style, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let overrides: StyleOverrides =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(overrides.into_style()?)
}
