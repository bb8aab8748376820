//! Logging configuration.
//!
//! Provides CLI arguments for configuring tracing/logging output with support for:
//! - Verbosity levels via `-v/-vv/-vvv` flags
//! - Custom log filters via `RUST_LOG` environment variable
//! - Log file output via `--log.file` flag

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use super::{CliError, Result};

/// Crates whose logs the verbosity flags enable.
const LOG_TARGETS: [&str; 2] = ["factory_deployer", "keyless_factory"];

/// Logging configuration arguments.
#[derive(Debug, Clone, Default, Parser)]
pub struct LogArgs {
    /// Increase logging verbosity (-v = error, -vv = warn, -vvv = info, -vvvv = debug, -vvvvv =
    /// trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log file path. If specified, logs are written to this file instead of stderr.
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colorful console logging. Only applies when logging to stderr (no --log.file).
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// Returns the level enabled by the `-v` flags, `None` when logging is off.
    pub const fn level(&self) -> Option<Level> {
        match self.verbose {
            0 => None,
            1 => Some(Level::ERROR),
            2 => Some(Level::WARN),
            3 => Some(Level::INFO),
            4 => Some(Level::DEBUG),
            _ => Some(Level::TRACE),
        }
    }

    fn filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        match self.level() {
            None => EnvFilter::new("off"),
            Some(level) => EnvFilter::new(
                LOG_TARGETS.map(|target| format!("{target}={level}")).join(","),
            ),
        }
    }

    /// Initialize the tracing subscriber based on the logging configuration.
    ///
    /// The log level is determined in the following order of precedence:
    /// 1. `RUST_LOG` environment variable (if set)
    /// 2. `-v` flags (increases from ERROR to WARN/INFO/DEBUG/TRACE)
    /// 3. Default is no logging (OFF)
    ///
    /// Log target is only shown for DEBUG level and above.
    pub fn init(&self) -> Result<()> {
        let filter = self.filter();
        let show_target = self.verbose >= 4;

        let result = if let Some(ref log_file) = self.log_file {
            let file = std::fs::File::create(log_file)
                .map_err(|source| CliError::FileWrite { path: log_file.clone(), source })?;
            fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(file)
                .with_ansi(false)
                .try_init()
        } else {
            fmt()
                .with_env_filter(filter)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .with_ansi(!self.log_no_color)
                .try_init()
        };
        result.map_err(|e| CliError::Logging(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let level = |verbose| LogArgs { verbose, ..Default::default() }.level();
        assert_eq!(level(0), None);
        assert_eq!(level(1), Some(Level::ERROR));
        assert_eq!(level(3), Some(Level::INFO));
        assert_eq!(level(9), Some(Level::TRACE));
    }
}
