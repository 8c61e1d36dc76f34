//! Installs the `tracing` subscriber used by applications embedding the client.

use crate::config::LoggingConfig;
use crate::core::{ReataError, Result};
use tracing::Level;

/// Installs a global fmt subscriber at the configured level.
///
/// Fails with a configuration error when the level is unknown or a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ReataError::Config(format!("unknown log level '{}'", config.level)))?;

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(config.ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| ReataError::Config(e.to_string()))
}
