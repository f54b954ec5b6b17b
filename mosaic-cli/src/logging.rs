//! Tracing subscriber setup.
//!
//! Logs always go to stderr so command output on stdout stays parseable.
//! The filter comes from `MOSAIC_LOG` when set, otherwise from the level
//! passed on the command line.

use clap::ValueEnum;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::CliError;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "MOSAIC_LOG";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Install the global subscriber.
pub fn init(format: LogFormat, level: &str) -> Result<(), CliError> {
    let filter = build_env_filter(level)?;
    let base = Registry::default().with(filter);

    let result = match format {
        LogFormat::Json => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| CliError::Logging(e.to_string()))
}

fn build_env_filter(level: &str) -> Result<EnvFilter, CliError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| CliError::Logging(format!("invalid log level '{}': {}", level, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        assert!(build_env_filter("debug").is_ok());
        assert!(build_env_filter("mosaic_core=trace,warn").is_ok());
        assert!(matches!(
            build_env_filter("mosaic_core=loud"),
            Err(CliError::Logging(_))
        ));
    }
}
