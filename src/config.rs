use crate::core::{ReataError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// SQLite caps a statement at 32766 bound parameters.
pub const DEFAULT_MAX_BIND_PARAMS: usize = 32_766;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub sqlite: SqliteConfig,
    pub logging: LoggingConfig,
}

/// Client behaviour.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory holding the files of created databases. In-memory when unset.
    pub data_dir: Option<PathBuf>,
    /// Upper bound on bound parameters per bulk insert statement.
    pub max_bind_params: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            data_dir: None,
            max_bind_params: DEFAULT_MAX_BIND_PARAMS,
        }
    }
}

/// SQLite-related configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqliteConfig {
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        SqliteConfig {
            busy_timeout_ms: 5_000,
            foreign_keys: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            ansi: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.client.max_bind_params == 0 {
            return Err(ReataError::Config(
                "client.max_bind_params must be greater than zero".to_string(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ReataError::Config(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).map_err(|e| ReataError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = reata::config::load_config("reata.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// `<user config dir>/reata/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reata").join("config.toml"))
}

/// Loads the user's configuration file, falling back to defaults when absent.
pub fn load_default_config() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => load_config(path),
        _ => Ok(Config::default()),
    }
}
