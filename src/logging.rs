//! Structured logging setup shared by the binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the host.
//! [`init_logging`] is the convenience used by `resource-metadata`.

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter, e.g. `resource_overlay=debug`.
pub const LOG_ENV_VAR: &str = "RESOURCE_OVERLAY_LOG";

const DEFAULT_FILTER: &str = "info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
  /// Human readable lines.
  #[default]
  Text,
  /// One JSON object per line.
  Json,
}

/// Build the filter from [`LOG_ENV_VAR`], falling back to `info`.
pub fn env_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber writing to stderr.
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
  let registry = tracing_subscriber::registry().with(env_filter());

  match format {
    LogFormat::Json => registry
      .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
      .try_init(),
    LogFormat::Text => registry
      .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
      .try_init(),
  }
  .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn second_initialisation_fails_cleanly() {
    let _ = init_logging(LogFormat::Text);
    assert!(init_logging(LogFormat::Json).is_err());
  }

  #[test]
  fn parses_format_names() {
    assert_eq!(LogFormat::from_str("json", true), Ok(LogFormat::Json));
    assert_eq!(LogFormat::default(), LogFormat::Text);
  }
}
