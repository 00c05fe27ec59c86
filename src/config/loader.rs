//! Configuration Loader - File Loading, Flag Overlay and Validation
//!
//! Handles loading the optional TOML file, layering command-line flags on
//! top, and rejecting settings the exporter cannot run with.

use std::path::Path;

use anyhow::{Context, Result};

use super::{AppConfig, Cli};

/// Log levels accepted by `--log.level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Paths the router reserves for itself.
const RESERVED_PATHS: [&str; 2] = ["/", "/live"];

/// Build the effective configuration from parsed flags.
///
/// Reads `--config.file` when given, overlays the remaining flags and
/// validates the result.
///
/// # Errors
/// Returns detailed error if:
/// - The config file doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn resolve(cli: Cli) -> Result<AppConfig> {
  let mut config = match &cli.config_file {
    Some(path) => load_config(path)?,
    None => AppConfig::default(),
  };

  cli.apply(&mut config);
  validate_config(&config)?;

  Ok(config)
}

/// Load the TOML file layer; validation runs after flags are applied.
fn load_config(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  toml::from_str(&content)
    .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Both report paths set
/// - A usable listen address
/// - A telemetry path that does not collide with the other routes
/// - A known log level
fn validate_config(config: &AppConfig) -> Result<()> {
  // Report validation
  anyhow::ensure!(
    !config.csv.stats.as_os_str().is_empty(),
    "csv.stats is required (path to the Locust stats csv file)"
  );
  anyhow::ensure!(
    !config.csv.failures.as_os_str().is_empty(),
    "csv.failures is required (path to the Locust failures csv file)"
  );

  // Web validation
  let listen = &config.web.listen_address;
  anyhow::ensure!(
    listen.rsplit_once(':').is_some_and(|(_, port)| port.parse::<u16>().is_ok()),
    "web.listen-address must be host:port or :port, got {listen:?}"
  );

  let path = &config.web.telemetry_path;
  anyhow::ensure!(
    path.starts_with('/'),
    "web.telemetry-path must start with '/', got {path:?}"
  );
  anyhow::ensure!(
    !RESERVED_PATHS.contains(&path.as_str()),
    "web.telemetry-path {path:?} is reserved"
  );

  // Log validation
  anyhow::ensure!(
    LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()),
    "log.level must be one of {LOG_LEVELS:?}, got {:?}",
    config.log.level
  );

  Ok(())
}
